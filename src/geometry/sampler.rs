use super::curve::{CurveKind, CurveSegment};

/// Smallest step the sampler will ever take, in meters
pub const MIN_STEP: f64 = 0.01;

/// Samples closer than this to the span end are dropped in favour of the end
const END_TOLERANCE: f64 = 1e-6;

/// Choose a sampling step for a segment so the chordal error stays small
///
/// Lines keep the base step. Arcs tighten with curvature and keep at least ten
/// steps per segment. Transition curves keep at least twenty.
pub fn adaptive_step(segment: &CurveSegment, base_step: f64) -> f64 {
    let step = match segment.kind {
        CurveKind::Line => base_step,
        CurveKind::Arc { curvature } if curvature != 0.0 => {
            let radius = 1.0 / curvature.abs();
            base_step.min(radius * 0.1).min(segment.length / 10.0)
        }
        CurveKind::Arc { .. } => base_step,
        CurveKind::Transition { .. } => base_step.min(segment.length / 20.0),
    };
    step.max(MIN_STEP)
}

/// Walk `[start, end]` and return the sample coordinates
///
/// `step_at` gives the step to take from the current coordinate. The exact
/// start and end are always included, so any non-empty span yields at least two
/// samples even when the last step is shorter than requested. An empty or
/// inverted span yields none.
pub fn sample_span<F>(start: f64, end: f64, step_at: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    if !(start < end) {
        return Vec::new();
    }

    let mut samples = vec![start];
    let mut s = start;
    loop {
        let step = step_at(s);
        let step = if step.is_finite() {
            step.max(MIN_STEP)
        } else {
            MIN_STEP
        };
        s += step;
        if s >= end - END_TOLERANCE {
            break;
        }
        samples.push(s);
    }
    samples.push(end);

    samples
}
