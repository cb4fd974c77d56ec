pub mod lanes;
pub mod ledger;
pub mod marks;
pub mod network;
pub mod session;

pub use lanes::build_lane_surfaces;
pub use ledger::{LaneEdges, LaneLedger};
pub use marks::{build_lane_marks, dash_starts};
pub use network::{MeshConfig, generate_network, generate_road};
pub use session::{BuildError, BuildFailure, MeshKey, MeshKind, MeshOutput, MeshSession};
