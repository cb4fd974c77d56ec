use crate::domain::{Lane, LaneSection, LaneSide};

/// Lateral extent of one lane, as unsigned distances from the reference line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneEdges {
    pub side: LaneSide,
    pub width: f64,
    /// Distance of the edge nearest the reference line
    pub inner: f64,
    /// Distance of the edge farthest from the reference line
    pub outer: f64,
}

impl LaneEdges {
    /// Signed offsets `(left edge, right edge)` along the frame normal
    pub fn lateral(&self) -> (f64, f64) {
        match self.side {
            LaneSide::Left => (self.outer, self.inner),
            LaneSide::Right => (-self.inner, -self.outer),
            LaneSide::Center => (self.outer, -self.outer),
        }
    }

    /// Signed offset of the inner boundary, where the lane's mark is painted
    pub fn boundary(&self) -> f64 {
        match self.side {
            LaneSide::Left => self.inner,
            LaneSide::Right => -self.inner,
            LaneSide::Center => 0.0,
        }
    }
}

/// Cumulative lane offsets of one lane section at one section-local `ds`
#[derive(Debug, Clone, Default)]
pub struct LaneLedger {
    entries: Vec<(i32, LaneEdges)>,
    left_total: f64,
    right_total: f64,
}

impl LaneLedger {
    /// Sum widths outward from the reference line for both lane groups
    ///
    /// Lane groups must be sorted nearest-center first.
    pub fn at(section: &LaneSection, ds: f64) -> Self {
        let mut entries = Vec::with_capacity(section.left.len() + section.right.len() + 1);

        let mut accumulate = |lanes: &[Lane], side: LaneSide| {
            let mut total = 0.0;
            for lane in lanes {
                let width = lane.width_at(ds);
                let inner = total;
                total += width;
                entries.push((
                    lane.id,
                    LaneEdges {
                        side,
                        width,
                        inner,
                        outer: total,
                    },
                ));
            }
            total
        };
        let left_total = accumulate(&section.left, LaneSide::Left);
        let right_total = accumulate(&section.right, LaneSide::Right);

        if let Some(center) = &section.center {
            let width = center.width_at(ds);
            entries.push((
                center.id,
                LaneEdges {
                    side: LaneSide::Center,
                    width,
                    inner: 0.0,
                    outer: width / 2.0,
                },
            ));
        }

        Self {
            entries,
            left_total,
            right_total,
        }
    }

    pub fn edges(&self, lane_id: i32) -> Option<LaneEdges> {
        self.entries
            .iter()
            .find(|(id, _)| *id == lane_id)
            .map(|(_, edges)| *edges)
    }

    /// Combined width of all left lanes
    pub fn left_total(&self) -> f64 {
        self.left_total
    }

    /// Combined width of all right lanes
    pub fn right_total(&self) -> f64 {
        self.right_total
    }
}
