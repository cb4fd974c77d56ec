//! Road network loading from JSON or TOML documents

use anyhow::{Context, Result, bail};
use std::path::Path;

use crate::domain::RoadNetwork;

/// Document formats the loader understands, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Toml,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(InputFormat::Json),
            "toml" => Some(InputFormat::Toml),
            _ => None,
        }
    }
}

/// Parse a road network document and put it in builder order
///
/// The result is normalized but not validated.
pub fn parse_network(contents: &str, format: InputFormat) -> Result<RoadNetwork> {
    let mut network: RoadNetwork = match format {
        InputFormat::Json => {
            serde_json::from_str(contents).context("Failed to parse road network JSON")?
        }
        InputFormat::Toml => toml::from_str(contents).context("Failed to parse road network TOML")?,
    };
    network.normalize();
    Ok(network)
}

/// Read, parse, normalize and validate a road network file
pub fn load_network(path: &Path) -> Result<RoadNetwork> {
    let Some(format) = InputFormat::from_path(path) else {
        bail!(
            "Unsupported road network file {:?}: expected .json or .toml",
            path
        );
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read road network: {}", path.display()))?;
    let network = parse_network(&contents, format)
        .with_context(|| format!("Invalid road network: {}", path.display()))?;
    network
        .validate()
        .with_context(|| format!("Invalid road network: {}", path.display()))?;

    log::info!(
        "Loaded {} roads and {} junctions from {}",
        network.roads.len(),
        network.junctions.len(),
        path.display()
    );
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LaneType, MarkPattern};
    use crate::geometry::CurveKind;
    use tempfile::tempdir;

    const NETWORK_JSON: &str = r#"{
        "name": "test town",
        "roads": [
            {
                "id": "1",
                "length": 60.0,
                "planView": [
                    {"s": 0.0, "x": 0.0, "y": 0.0, "hdg": 0.0, "length": 20.0},
                    {"s": 20.0, "x": 20.0, "y": 0.0, "hdg": 0.0, "length": 20.0,
                     "kind": "arc", "curvature": 0.01},
                    {"s": 40.0, "x": 39.9, "y": 2.0, "hdg": 0.2, "length": 20.0,
                     "kind": "spiral", "curvStart": 0.01, "curvEnd": 0.0}
                ],
                "laneOffset": [{"s": 0.0, "a": 0.25}],
                "laneSections": [
                    {
                        "s": 0.0,
                        "left": [
                            {"id": 2, "type": "shoulder", "width": [{"a": 1.0}]},
                            {"id": 1, "width": [{"sOffset": 0.0, "a": 3.5}],
                             "roadMark": {"type": "broken", "color": "white"}}
                        ],
                        "center": {"id": 0, "type": "none",
                                   "roadMark": {"type": "solid solid", "color": "yellow"}},
                        "right": [
                            {"id": -1, "width": [{"a": 3.5}], "roadMark": {"type": "solid"}}
                        ]
                    }
                ]
            }
        ],
        "junctions": [
            {"id": "100", "connections": [
                {"incomingRoad": "1", "connectingRoad": "2", "contactPoint": "end"}
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_json_network() {
        let network = parse_network(NETWORK_JSON, InputFormat::Json).unwrap();
        assert_eq!(network.name, "test town");

        let road = network.road("1").unwrap();
        assert_eq!(road.plan_view.len(), 3);
        assert_eq!(road.plan_view[1].kind, CurveKind::Arc { curvature: 0.01 });
        assert!(matches!(road.plan_view[2].kind, CurveKind::Transition { .. }));
        assert_eq!(road.lane_offsets[0].a, 0.25);

        let section = &road.lane_sections[0];
        // Left group sorted nearest-center first
        assert_eq!(section.left[0].id, 1);
        assert_eq!(section.left[1].lane_type, LaneType::Shoulder);
        assert_eq!(
            section.left[0].road_mark.as_ref().unwrap().pattern(),
            Some(MarkPattern::Broken)
        );
        assert_eq!(
            section.center.as_ref().unwrap().road_mark.as_ref().unwrap().pattern(),
            Some(MarkPattern::Double)
        );

        // Unknown connecting road is a warning, not an error
        assert!(network.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_network() {
        let toml = r#"
            [[roads]]
            id = "3"
            length = 10.0

            [[roads.plan_view]]
            s = 0.0
            x = 0.0
            y = 0.0
            hdg = 0.0
            length = 10.0

            [[roads.lane_sections]]
            s = 0.0

            [[roads.lane_sections.right]]
            id = -1
            widths = [{ a = 3.0 }]
        "#;

        let network = parse_network(toml, InputFormat::Toml).unwrap();
        let road = network.road("3").unwrap();
        assert_eq!(road.plan_view[0].kind, CurveKind::Line);
        assert_eq!(road.lane_sections[0].right[0].width_at(5.0), 3.0);
    }

    #[test]
    fn test_unknown_segment_kind_becomes_line() {
        let json = r#"{"roads": [{"id": "1", "length": 5.0, "planView": [
            {"s": 0.0, "x": 0.0, "y": 0.0, "hdg": 0.0, "length": 5.0, "kind": "poly3"}
        ]}]}"#;
        let network = parse_network(json, InputFormat::Json).unwrap();
        assert_eq!(network.roads[0].plan_view[0].kind, CurveKind::Line);
    }

    #[test]
    fn test_load_network_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("town.json");
        std::fs::write(&path, NETWORK_JSON).unwrap();

        let network = load_network(&path).unwrap();
        assert_eq!(network.roads.len(), 1);
    }

    #[test]
    fn test_load_rejects_invalid_network() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"roads": []}"#).unwrap();

        let err = load_network(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("no roads"));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("town.xodr");
        std::fs::write(&path, "<OpenDRIVE/>").unwrap();

        assert!(load_network(&path).is_err());
    }

    #[test]
    fn test_negative_segment_length_rejected() {
        let json = r#"{"roads": [{"id": "1", "length": 5.0, "planView": [
            {"s": 0.0, "x": 0.0, "y": 0.0, "hdg": 0.0, "length": -5.0}
        ]}]}"#;
        assert!(parse_network(json, InputFormat::Json).is_err());
    }
}
