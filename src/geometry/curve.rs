//! Reference-line curve segments
//!
//! A road's plan view is a sequence of segments, each starting at arc-length
//! `s0` with a pose `(x0, y0, h0)`. Every segment answers the same three
//! queries (position, tangent, normal) at an absolute arc-length `s`; queries
//! outside `[s0, s0 + length]` are clamped onto the segment.

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while constructing a curve segment
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("segment at s={s} has non-positive length {length}")]
    NonPositiveLength { s: f64, length: f64 },

    #[error("segment at s={s} has non-finite parameters")]
    NonFinite { s: f64 },
}

/// Shape of a curve segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveKind {
    /// Straight line
    Line,
    /// Constant curvature; positive turns left
    Arc { curvature: f64 },
    /// Curvature varying linearly from start to end (clothoid approximation)
    Transition {
        curvature_start: f64,
        curvature_end: f64,
    },
}

/// Pose on the reference line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, counter-clockwise from +X
    pub heading: f64,
}

impl Pose {
    pub fn tangent(&self) -> (f64, f64) {
        (self.heading.cos(), self.heading.sin())
    }

    /// Unit vector pointing to the left of the travel direction
    pub fn normal(&self) -> (f64, f64) {
        let (tx, ty) = self.tangent();
        (-ty, tx)
    }
}

/// One immutable plan-view segment
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "SegmentRecord")]
pub struct CurveSegment {
    pub s0: f64,
    pub x0: f64,
    pub y0: f64,
    pub h0: f64,
    pub length: f64,
    pub kind: CurveKind,
}

impl CurveSegment {
    pub fn new(
        s0: f64,
        x0: f64,
        y0: f64,
        h0: f64,
        length: f64,
        kind: CurveKind,
    ) -> Result<Self, GeometryError> {
        let params_finite = match kind {
            CurveKind::Line => true,
            CurveKind::Arc { curvature } => curvature.is_finite(),
            CurveKind::Transition {
                curvature_start,
                curvature_end,
            } => curvature_start.is_finite() && curvature_end.is_finite(),
        };
        if !(s0.is_finite() && x0.is_finite() && y0.is_finite() && h0.is_finite())
            || !length.is_finite()
            || !params_finite
        {
            return Err(GeometryError::NonFinite { s: s0 });
        }
        if length <= 0.0 {
            return Err(GeometryError::NonPositiveLength { s: s0, length });
        }

        Ok(Self {
            s0,
            x0,
            y0,
            h0,
            length,
            kind,
        })
    }

    pub fn line(s0: f64, x0: f64, y0: f64, h0: f64, length: f64) -> Result<Self, GeometryError> {
        Self::new(s0, x0, y0, h0, length, CurveKind::Line)
    }

    pub fn arc(
        s0: f64,
        x0: f64,
        y0: f64,
        h0: f64,
        length: f64,
        curvature: f64,
    ) -> Result<Self, GeometryError> {
        Self::new(s0, x0, y0, h0, length, CurveKind::Arc { curvature })
    }

    pub fn transition(
        s0: f64,
        x0: f64,
        y0: f64,
        h0: f64,
        length: f64,
        curvature_start: f64,
        curvature_end: f64,
    ) -> Result<Self, GeometryError> {
        Self::new(
            s0,
            x0,
            y0,
            h0,
            length,
            CurveKind::Transition {
                curvature_start,
                curvature_end,
            },
        )
    }

    /// Arc-length where this segment ends
    pub fn end_s(&self) -> f64 {
        self.s0 + self.length
    }

    /// Local arc-length of `s`, clamped to the segment
    fn local(&self, s: f64) -> f64 {
        (s - self.s0).clamp(0.0, self.length)
    }

    /// Position and heading at absolute arc-length `s`
    pub fn position(&self, s: f64) -> Pose {
        let ds = self.local(s);
        match self.kind {
            CurveKind::Line => self.line_position(ds),
            CurveKind::Arc { curvature } => self.arc_position(ds, curvature),
            CurveKind::Transition {
                curvature_start,
                curvature_end,
            } => self.transition_position(ds, curvature_start, curvature_end),
        }
    }

    /// Unit tangent at `s`
    pub fn tangent(&self, s: f64) -> (f64, f64) {
        match self.kind {
            CurveKind::Line => (self.h0.cos(), self.h0.sin()),
            _ => self.position(s).tangent(),
        }
    }

    /// Unit normal at `s`, the tangent rotated +90 degrees
    pub fn normal(&self, s: f64) -> (f64, f64) {
        let (tx, ty) = self.tangent(s);
        (-ty, tx)
    }

    fn line_position(&self, ds: f64) -> Pose {
        Pose {
            x: self.x0 + ds * self.h0.cos(),
            y: self.y0 + ds * self.h0.sin(),
            heading: self.h0,
        }
    }

    fn arc_position(&self, ds: f64, curvature: f64) -> Pose {
        if curvature == 0.0 {
            return self.line_position(ds);
        }

        let (cx, cy) = self.arc_center(curvature);
        let radius = 1.0 / curvature.abs();
        let delta = ds * curvature;

        let start_angle = (self.y0 - cy).atan2(self.x0 - cx);
        let angle = start_angle + delta;

        Pose {
            x: cx + radius * angle.cos(),
            y: cy + radius * angle.sin(),
            heading: self.h0 + delta,
        }
    }

    /// Arc center: one radius along the start normal, on the turning side
    pub fn arc_center(&self, curvature: f64) -> (f64, f64) {
        let radius = 1.0 / curvature.abs();
        let side = curvature.signum();
        (
            self.x0 - self.h0.sin() * radius * side,
            self.y0 + self.h0.cos() * radius * side,
        )
    }

    fn transition_position(&self, ds: f64, k0: f64, k1: f64) -> Pose {
        let rate = (k1 - k0) / self.length;
        let heading_at = |u: f64| self.h0 + k0 * u + 0.5 * rate * u * u;

        if ds <= 0.0 {
            return Pose {
                x: self.x0,
                y: self.y0,
                heading: self.h0,
            };
        }

        let num_steps = (self.length.floor() as usize).max(10);
        let t = ds / self.length;
        let steps = ((t * num_steps as f64).ceil() as usize).max(1);
        let h = ds / steps as f64;

        let (mut x, mut y) = (self.x0, self.y0);
        for i in 0..steps {
            let mid = heading_at((i as f64 + 0.5) * h);
            x += h * mid.cos();
            y += h * mid.sin();
        }

        Pose {
            x,
            y,
            heading: heading_at(ds),
        }
    }
}

fn default_kind() -> String {
    "line".to_string()
}

/// Serialized form of a plan-view segment
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRecord {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub length: f64,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub curvature: f64,
    #[serde(default, alias = "curvStart", alias = "curvatureStart")]
    pub curv_start: f64,
    #[serde(default, alias = "curvEnd", alias = "curvatureEnd")]
    pub curv_end: f64,
}

impl TryFrom<SegmentRecord> for CurveSegment {
    type Error = GeometryError;

    fn try_from(r: SegmentRecord) -> Result<Self, Self::Error> {
        let kind = match r.kind.as_str() {
            "line" => CurveKind::Line,
            "arc" => CurveKind::Arc {
                curvature: r.curvature,
            },
            "spiral" | "transition" => CurveKind::Transition {
                curvature_start: r.curv_start,
                curvature_end: r.curv_end,
            },
            other => {
                log::warn!(
                    "Unsupported geometry kind '{}' at s={}, treating it as a line",
                    other,
                    r.s
                );
                CurveKind::Line
            }
        };

        CurveSegment::new(r.s, r.x, r.y, r.hdg, r.length, kind)
    }
}
