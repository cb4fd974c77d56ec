use serde::Deserialize;

use crate::geometry::{CubicPoly, eval_piecewise};
use crate::mesh::material;

/// Lane classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneType {
    #[default]
    Driving,
    Shoulder,
    Border,
    None,
    #[serde(other)]
    Other,
}

impl LaneType {
    /// Material name used for this lane's drivable surface
    pub fn surface_material(self) -> &'static str {
        match self {
            LaneType::Shoulder => material::SHOULDER,
            _ => material::ASPHALT,
        }
    }
}

/// Side of the reference line a lane lies on, from the sign of its id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneSide {
    Left,
    Center,
    Right,
}

impl LaneSide {
    pub fn from_id(id: i32) -> Self {
        match id {
            id if id > 0 => LaneSide::Left,
            0 => LaneSide::Center,
            _ => LaneSide::Right,
        }
    }
}

/// Painted line pattern derived from a road mark's type token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPattern {
    Solid,
    Broken,
    Double,
}

fn default_mark_type() -> String {
    "solid".to_string()
}
fn default_mark_width() -> f64 {
    0.15
}
fn default_mark_color() -> String {
    "white".to_string()
}
fn default_standard() -> String {
    "standard".to_string()
}
fn default_lane_change() -> String {
    "both".to_string()
}

/// Lane boundary marking
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoadMark {
    /// Start of the mark relative to the lane section start
    #[serde(default, alias = "sOffset")]
    pub s_offset: f64,
    /// Free-form type token such as "solid", "broken" or "solid solid"
    #[serde(rename = "type", default = "default_mark_type")]
    pub mark_type: String,
    #[serde(default = "default_mark_width")]
    pub width: f64,
    #[serde(default = "default_mark_color")]
    pub color: String,
    #[serde(default = "default_standard")]
    pub material: String,
    #[serde(default = "default_standard")]
    pub weight: String,
    #[serde(default = "default_lane_change", alias = "laneChange")]
    pub lane_change: String,
}

impl RoadMark {
    pub fn new(s_offset: f64, mark_type: &str, width: f64, color: &str) -> Self {
        Self {
            s_offset,
            mark_type: mark_type.to_string(),
            width,
            color: color.to_string(),
            material: default_standard(),
            weight: default_standard(),
            lane_change: default_lane_change(),
        }
    }

    pub fn is_solid(&self) -> bool {
        self.mark_type.contains("solid") && !self.mark_type.contains("broken")
    }

    pub fn is_broken(&self) -> bool {
        self.mark_type.contains("broken")
    }

    pub fn is_double(&self) -> bool {
        self.mark_type.matches("solid").count() >= 2
    }

    /// Pattern to render; double wins over solid, solid over broken
    pub fn pattern(&self) -> Option<MarkPattern> {
        if self.is_double() {
            Some(MarkPattern::Double)
        } else if self.is_solid() {
            Some(MarkPattern::Solid)
        } else if self.is_broken() {
            Some(MarkPattern::Broken)
        } else {
            None
        }
    }

    /// Material name for this mark's color
    pub fn material_name(&self) -> &'static str {
        if self.color.eq_ignore_ascii_case("yellow") {
            material::LANE_MARKING_YELLOW
        } else {
            material::LANE_MARKING_WHITE
        }
    }
}

/// A single lane of a lane section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Lane {
    /// Positive on the left, negative on the right, zero for the center lane
    pub id: i32,
    #[serde(rename = "type", default)]
    pub lane_type: LaneType,
    /// Width records, `s_offset` relative to the lane section start
    #[serde(default, alias = "width")]
    pub widths: Vec<CubicPoly>,
    #[serde(default, alias = "roadMark")]
    pub road_mark: Option<RoadMark>,
}

impl Lane {
    pub fn new(id: i32, lane_type: LaneType) -> Self {
        Self {
            id,
            lane_type,
            widths: Vec::new(),
            road_mark: None,
        }
    }

    pub fn with_width(mut self, record: CubicPoly) -> Self {
        self.widths.push(record);
        self
    }

    pub fn with_road_mark(mut self, mark: RoadMark) -> Self {
        self.road_mark = Some(mark);
        self
    }

    pub fn side(&self) -> LaneSide {
        LaneSide::from_id(self.id)
    }

    /// Width at section-local arc-length `ds`
    pub fn width_at(&self, ds: f64) -> f64 {
        eval_piecewise(&self.widths, ds)
    }

    /// True when any width record is non-zero
    pub fn has_drivable_width(&self) -> bool {
        self.widths.iter().any(|w| !w.is_zero())
    }
}

/// Cross-section layout starting at `s`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LaneSection {
    pub s: f64,
    /// Left lanes, nearest to the center first (ids ascending)
    #[serde(default)]
    pub left: Vec<Lane>,
    #[serde(default)]
    pub center: Option<Lane>,
    /// Right lanes, nearest to the center first (ids descending)
    #[serde(default)]
    pub right: Vec<Lane>,
}

impl LaneSection {
    pub fn new(s: f64, left: Vec<Lane>, center: Option<Lane>, right: Vec<Lane>) -> Self {
        let mut section = Self {
            s,
            left,
            center,
            right,
        };
        section.sort_lanes();
        section
    }

    /// Order both lane groups nearest-center first and width records by offset
    pub fn sort_lanes(&mut self) {
        self.left.sort_by_key(|l| l.id);
        self.right.sort_by_key(|l| std::cmp::Reverse(l.id));
        for lane in self.lanes_mut() {
            lane.widths
                .sort_by(|a, b| a.s_offset.total_cmp(&b.s_offset));
        }
    }

    /// All lanes: left group, right group, then the center lane
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.left
            .iter()
            .chain(self.right.iter())
            .chain(self.center.iter())
    }

    fn lanes_mut(&mut self) -> impl Iterator<Item = &mut Lane> {
        self.left
            .iter_mut()
            .chain(self.right.iter_mut())
            .chain(self.center.iter_mut())
    }
}
