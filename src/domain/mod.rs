pub mod lane;
pub mod network;
pub mod road;

pub use lane::{Lane, LaneSection, LaneSide, LaneType, MarkPattern, RoadMark};
pub use network::{Connection, ContactPoint, Junction, NetworkError, RoadNetwork};
pub use road::{Frame, Road};
