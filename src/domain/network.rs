use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use super::lane::{LaneSection, LaneSide};
use super::road::Road;

/// Fatal problems in an input network, rejected before any mesh is built
#[derive(Debug, Error, PartialEq)]
pub enum NetworkError {
    #[error("road network contains no roads")]
    NoRoads,

    #[error("duplicate road id '{0}'")]
    DuplicateRoad(String),

    #[error("road '{road}' has non-positive length {length}")]
    InvalidLength { road: String, length: f64 },

    #[error("road '{0}' has an empty plan view")]
    EmptyPlanView(String),

    #[error("road '{road}': lane {lane} is in the {group} group")]
    LaneOnWrongSide {
        road: String,
        lane: i32,
        group: &'static str,
    },

    #[error("road '{road}': non-finite value in {field}")]
    NonFinite { road: String, field: &'static str },
}

/// Which end of a connecting road touches the incoming road
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPoint {
    #[default]
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "incoming_road")]
    pub incoming_road: String,
    #[serde(alias = "connecting_road")]
    pub connecting_road: String,
    #[serde(default, alias = "contact_point")]
    pub contact_point: ContactPoint,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Junction {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// All roads and junctions of one input document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoadNetwork {
    #[serde(default)]
    pub name: String,
    pub roads: Vec<Road>,
    #[serde(default)]
    pub junctions: Vec<Junction>,
}

impl RoadNetwork {
    pub fn new(roads: Vec<Road>) -> Self {
        Self {
            name: String::new(),
            roads,
            junctions: Vec::new(),
        }
    }

    pub fn road(&self, id: &str) -> Option<&Road> {
        self.roads.iter().find(|r| r.id == id)
    }

    /// Put loaded data into the order the builders expect: plan view and
    /// sections by `s`, lane groups nearest-center first
    pub fn normalize(&mut self) {
        for road in &mut self.roads {
            road.plan_view.sort_by(|a, b| a.s0.total_cmp(&b.s0));
            road.lane_offsets
                .sort_by(|a, b| a.s_offset.total_cmp(&b.s_offset));
            road.elevation
                .sort_by(|a, b| a.s_offset.total_cmp(&b.s_offset));
            road.lane_sections.sort_by(|a, b| a.s.total_cmp(&b.s));
            for section in &mut road.lane_sections {
                section.sort_lanes();
            }
        }
    }

    /// Check the network is buildable
    ///
    /// Junction connections that name unknown roads only produce warnings.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.roads.is_empty() {
            return Err(NetworkError::NoRoads);
        }

        let mut seen = HashSet::new();
        for road in &self.roads {
            if !seen.insert(road.id.as_str()) {
                return Err(NetworkError::DuplicateRoad(road.id.clone()));
            }
            validate_road(road)?;
        }

        for junction in &self.junctions {
            for connection in &junction.connections {
                for id in [&connection.incoming_road, &connection.connecting_road] {
                    if !seen.contains(id.as_str()) {
                        log::warn!(
                            "Junction '{}' references unknown road '{}'",
                            junction.id,
                            id
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

fn validate_road(road: &Road) -> Result<(), NetworkError> {
    if !road.length.is_finite() {
        return Err(non_finite(road, "length"));
    }
    if road.length <= 0.0 {
        return Err(NetworkError::InvalidLength {
            road: road.id.clone(),
            length: road.length,
        });
    }
    if road.plan_view.is_empty() {
        return Err(NetworkError::EmptyPlanView(road.id.clone()));
    }
    if !road.lane_offsets.iter().all(|p| p.is_finite()) {
        return Err(non_finite(road, "lane offsets"));
    }
    if !road.elevation.iter().all(|p| p.is_finite()) {
        return Err(non_finite(road, "elevation"));
    }
    for section in &road.lane_sections {
        validate_section(road, section)?;
    }
    Ok(())
}

fn validate_section(road: &Road, section: &LaneSection) -> Result<(), NetworkError> {
    if !section.s.is_finite() {
        return Err(non_finite(road, "lane section start"));
    }

    let groups = [
        ("left", LaneSide::Left, section.left.as_slice()),
        ("right", LaneSide::Right, section.right.as_slice()),
        ("center", LaneSide::Center, section.center.as_slice()),
    ];
    for (group, side, lanes) in groups {
        for lane in lanes {
            if lane.side() != side {
                return Err(NetworkError::LaneOnWrongSide {
                    road: road.id.clone(),
                    lane: lane.id,
                    group,
                });
            }
            if !lane.widths.iter().all(|w| w.is_finite()) {
                return Err(non_finite(road, "lane widths"));
            }
            if let Some(mark) = &lane.road_mark
                && !(mark.width.is_finite() && mark.s_offset.is_finite())
            {
                return Err(non_finite(road, "road mark"));
            }
        }
    }
    Ok(())
}

fn non_finite(road: &Road, field: &'static str) -> NetworkError {
    NetworkError::NonFinite {
        road: road.id.clone(),
        field,
    }
}
