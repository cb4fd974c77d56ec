pub mod curve;
pub mod poly;
pub mod sampler;

pub use curve::{CurveKind, CurveSegment, GeometryError, Pose};
pub use poly::{CubicPoly, eval_piecewise};
pub use sampler::{adaptive_step, sample_span};
