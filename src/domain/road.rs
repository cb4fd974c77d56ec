use serde::Deserialize;

use super::lane::LaneSection;
use crate::geometry::{CubicPoly, CurveSegment, adaptive_step, eval_piecewise};

/// Queries this close past the last segment's end still resolve to it
const END_TOLERANCE: f64 = 1e-6;

/// A road with its plan view, lateral/vertical profiles and lane sections
#[derive(Debug, Clone, Deserialize)]
pub struct Road {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Total length of the reference line
    pub length: f64,
    /// Junction id when this road connects roads inside a junction
    #[serde(default)]
    pub junction: Option<String>,
    /// Ordered reference-line segments tiling `[0, length)`
    #[serde(alias = "planView")]
    pub plan_view: Vec<CurveSegment>,
    /// Lateral shift of the lane reference line (absolute `s`)
    #[serde(default, alias = "laneOffset")]
    pub lane_offsets: Vec<CubicPoly>,
    /// Elevation profile (absolute `s`)
    #[serde(default)]
    pub elevation: Vec<CubicPoly>,
    #[serde(default, alias = "laneSections")]
    pub lane_sections: Vec<LaneSection>,
}

/// Evaluated lane reference line at one arc-length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub heading: f64,
    /// Unit vector to the left of the travel direction
    pub normal: (f64, f64),
}

impl Frame {
    /// Point `t` meters to the left of the reference line (negative = right),
    /// raised by `lift`
    pub fn lateral(&self, t: f64, lift: f64) -> [f64; 3] {
        [
            self.x + self.normal.0 * t,
            self.y + self.normal.1 * t,
            self.z + lift,
        ]
    }
}

impl Road {
    pub fn new(id: impl Into<String>, length: f64, plan_view: Vec<CurveSegment>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            length,
            junction: None,
            plan_view,
            lane_offsets: Vec::new(),
            elevation: Vec::new(),
            lane_sections: Vec::new(),
        }
    }

    pub fn with_lane_section(mut self, section: LaneSection) -> Self {
        self.lane_sections.push(section);
        self
    }

    pub fn with_lane_offset(mut self, record: CubicPoly) -> Self {
        self.lane_offsets.push(record);
        self
    }

    pub fn with_elevation(mut self, record: CubicPoly) -> Self {
        self.elevation.push(record);
        self
    }

    pub fn with_junction(mut self, junction: impl Into<String>) -> Self {
        self.junction = Some(junction.into());
        self
    }

    /// True when this road is a connecting road inside a junction
    pub fn is_connecting_road(&self) -> bool {
        self.junction.is_some()
    }

    /// Segment whose `[s0, s0 + length)` range contains `s`
    ///
    /// The last segment is closed at its end so the road end resolves. Returns
    /// `None` for coordinates before the first segment or inside a gap.
    pub fn segment_at(&self, s: f64) -> Option<&CurveSegment> {
        let idx = self.plan_view.partition_point(|g| g.s0 <= s);
        if idx == 0 {
            return None;
        }
        let segment = &self.plan_view[idx - 1];
        let is_last = idx == self.plan_view.len();
        let inside = if is_last {
            s <= segment.end_s() + END_TOLERANCE
        } else {
            s < segment.end_s() + END_TOLERANCE
        };
        inside.then_some(segment)
    }

    /// Lane reference frame at `s`: plan-view pose shifted by the lane offset,
    /// with elevation as z
    pub fn frame_at(&self, s: f64) -> Option<Frame> {
        let segment = self.segment_at(s)?;
        let pose = segment.position(s);
        let normal = pose.normal();
        let offset = eval_piecewise(&self.lane_offsets, s);

        Some(Frame {
            s,
            x: pose.x + normal.0 * offset,
            y: pose.y + normal.1 * offset,
            z: eval_piecewise(&self.elevation, s),
            heading: pose.heading,
            normal,
        })
    }

    /// Base sampling step for this road; connecting roads are short and get a
    /// denser one
    pub fn base_step(&self, step: f64) -> f64 {
        if self.is_connecting_road() && self.length > 0.0 {
            step.min(self.length / 10.0)
        } else {
            step
        }
    }

    /// Adaptive step at `s` from the segment active there
    pub fn step_at(&self, s: f64, base_step: f64) -> f64 {
        match self.segment_at(s) {
            Some(segment) => adaptive_step(segment, base_step),
            None => base_step,
        }
    }

    /// Span built from `start`: `[start, min(start + length, length)]`
    ///
    /// Every lane section runs to the road end, so a section's ribbons overlap
    /// the sections after it. Starts at or past the road end give an empty span.
    pub fn span_from(&self, start: f64) -> (f64, f64) {
        (start, (start + self.length).min(self.length))
    }
}
