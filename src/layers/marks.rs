use super::ledger::LaneLedger;
use super::network::MeshConfig;
use super::session::{MeshKey, MeshSession};
use crate::domain::{LaneSection, MarkPattern, Road, RoadMark};
use crate::geometry::sample_span;
use crate::mesh::material::LANE_MARKING_WHITE;
use crate::mesh::{EdgePair, Mesh, MeshError, append_ribbon};

/// One lane's mark boundary on one lane section
struct MarkLine<'a> {
    road: &'a Road,
    section: &'a LaneSection,
    lane_id: i32,
}

impl MarkLine<'_> {
    /// Edge pairs of a strip `half_width` either side of the lane boundary,
    /// shifted along the normal by `shift`, over `[start, end]`
    fn edges(&self, start: f64, end: f64, shift: f64, half_width: f64, config: &MeshConfig) -> Vec<EdgePair> {
        let base_step = self.road.base_step(config.step);
        let samples = sample_span(start, end, |s| self.road.step_at(s, base_step));

        samples
            .into_iter()
            .filter_map(|s| {
                let Some(frame) = self.road.frame_at(s) else {
                    log::debug!(
                        "Road {}: no reference line at s={:.3}, mark sample skipped",
                        self.road.id,
                        s
                    );
                    return None;
                };
                let boundary = LaneLedger::at(self.section, s - self.section.s)
                    .edges(self.lane_id)?
                    .boundary()
                    + shift;
                Some(EdgePair {
                    s,
                    left: frame.lateral(boundary + half_width, config.mark_lift),
                    right: frame.lateral(boundary - half_width, config.mark_lift),
                })
            })
            .collect()
    }
}

/// Start of each visible dash of a broken line over `[start, end]`
///
/// Dashes begin at `start` and a dash that would run past `end` is dropped.
pub fn dash_starts(start: f64, end: f64, dash: f64, gap: f64) -> Vec<f64> {
    let mut starts = Vec::new();
    if !(dash > 0.0) || !(gap >= 0.0) {
        return starts;
    }
    let mut s = start;
    while s + dash <= end {
        starts.push(s);
        s += dash + gap;
    }
    starts
}

fn build_pattern(
    line: &MarkLine,
    mark: &RoadMark,
    pattern: MarkPattern,
    span: (f64, f64),
    config: &MeshConfig,
    mesh: &mut Mesh,
) -> Result<(), MeshError> {
    let (start, end) = span;
    let half_width = mark.width / 2.0;

    match pattern {
        MarkPattern::Solid => {
            let edges = line.edges(start, end, 0.0, half_width, config);
            append_ribbon(mesh, &edges, config.mark_texture_length)
        }
        MarkPattern::Broken => {
            let mut dashes = Mesh::default();
            for dash_start in dash_starts(start, end, config.dash_length, config.gap_length) {
                let edges = line.edges(
                    dash_start,
                    dash_start + config.dash_length,
                    0.0,
                    half_width,
                    config,
                );
                match append_ribbon(&mut dashes, &edges, config.mark_texture_length) {
                    Ok(()) | Err(MeshError::TooFewPoints { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            mesh.append(&dashes);
            Ok(())
        }
        MarkPattern::Double => {
            let mut pair = Mesh::default();
            for shift in [mark.width, -mark.width] {
                let edges = line.edges(start, end, shift, half_width, config);
                let mut side = Mesh::default();
                match append_ribbon(&mut side, &edges, config.mark_texture_length) {
                    Ok(()) => pair.append(&side),
                    Err(MeshError::TooFewPoints { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            mesh.append(&pair);
            Ok(())
        }
    }
}

/// Build the painted boundary line of every lane of `road` into `session`
///
/// Lanes without a road mark, or with a type that names no pattern, still get
/// a mark mesh; it ends up as the fallback rectangle. A mark found in a later
/// section takes over the material of a lane that had none before.
pub fn build_lane_marks(road: &Road, config: &MeshConfig, session: &mut MeshSession) {
    for section in &road.lane_sections {
        for lane in section.lanes() {
            let key = MeshKey::mark(&road.id, lane.id);
            let Some(mark) = &lane.road_mark else {
                session.register_placeholder(
                    &key,
                    LANE_MARKING_WHITE,
                    config.placeholder_mark_width,
                );
                continue;
            };
            let fallback_width = if mark.width > 0.0 {
                mark.width
            } else {
                config.placeholder_mark_width
            };
            session.register(&key, mark.material_name(), fallback_width);

            let Some(pattern) = mark.pattern() else {
                log::debug!(
                    "Road {} lane {}: mark type '{}' not drawn",
                    road.id,
                    lane.id,
                    mark.mark_type
                );
                continue;
            };

            let line = MarkLine {
                road,
                section,
                lane_id: lane.id,
            };
            let span = road.span_from(section.s + mark.s_offset);
            session.build(&key, |mesh| {
                build_pattern(&line, mark, pattern, span, config, mesh)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Lane, LaneType};
    use crate::geometry::{CubicPoly, CurveSegment};
    use crate::mesh::material::LANE_MARKING_YELLOW;

    fn road_with(length: f64, left_mark: Option<RoadMark>, center_mark: Option<RoadMark>) -> Road {
        let mut left = Lane::new(1, LaneType::Driving).with_width(CubicPoly::constant(0.0, 3.5));
        left.road_mark = left_mark;
        let mut center = Lane::new(0, LaneType::None);
        center.road_mark = center_mark;

        let mut road = Road::new(
            "9",
            length,
            vec![CurveSegment::line(0.0, 0.0, 0.0, 0.0, length).unwrap()],
        );
        road.lane_sections = vec![LaneSection::new(0.0, vec![left], Some(center), vec![])];
        road
    }

    fn build(road: &Road, config: &MeshConfig) -> MeshSession {
        let mut session = MeshSession::new();
        build_lane_marks(road, config, &mut session);
        session
    }

    #[test]
    fn test_dash_layout() {
        assert_eq!(dash_starts(0.0, 12.0, 3.0, 3.0), vec![0.0, 6.0]);
        assert_eq!(dash_starts(0.0, 15.0, 3.0, 3.0), vec![0.0, 6.0, 12.0]);
        assert_eq!(dash_starts(4.0, 6.0, 3.0, 3.0), Vec::<f64>::new());
        assert!(dash_starts(0.0, 10.0, 0.0, 3.0).is_empty());
    }

    #[test]
    fn test_solid_mark_on_inner_boundary() {
        let mark = RoadMark::new(0.0, "solid", 0.2, "white");
        let road = road_with(10.0, Some(mark), None);
        let session = build(&road, &MeshConfig::default());

        let mesh = session.mesh(&MeshKey::mark("9", 1)).unwrap();
        assert_eq!(mesh.material.as_deref(), Some(LANE_MARKING_WHITE));
        assert_eq!(mesh.vertex_count(), 22);
        // Left lane's inner boundary is the reference line
        assert!((mesh.positions[0][1] - 0.1).abs() < 1e-6);
        assert!((mesh.positions[11][1] + 0.1).abs() < 1e-6);
        assert!((mesh.positions[0][2] - 0.01).abs() < 1e-6);
        assert_eq!(mesh.tex_coords[10], [5.0, 0.0]);
    }

    #[test]
    fn test_broken_mark_dashes() {
        let mark = RoadMark::new(0.0, "broken", 0.15, "white");
        let road = road_with(12.0, Some(mark), None);
        let session = build(&road, &MeshConfig::default());

        // Two dashes of 3 m sampled at 1 m: 4 samples each
        let mesh = session.mesh(&MeshKey::mark("9", 1)).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.triangle_count(), 12);
        assert!((mesh.positions[8][0] - 6.0).abs() < 1e-6);
        assert!((mesh.positions[15][0] - 9.0).abs() < 1e-6);

        let road = road_with(15.0, Some(RoadMark::new(0.0, "broken", 0.15, "white")), None);
        let session = build(&road, &MeshConfig::default());
        assert_eq!(session.mesh(&MeshKey::mark("9", 1)).unwrap().vertex_count(), 24);
    }

    #[test]
    fn test_double_mark_merges_two_ribbons() {
        let mark = RoadMark::new(0.0, "solid solid", 0.15, "yellow");
        let road = road_with(10.0, None, Some(mark));
        let session = build(&road, &MeshConfig::default());

        let mesh = session.mesh(&MeshKey::mark("9", 0)).unwrap();
        assert_eq!(mesh.material.as_deref(), Some(LANE_MARKING_YELLOW));
        assert_eq!(mesh.vertex_count(), 44);
        assert_eq!(mesh.triangle_count(), 40);
        // Second ribbon starts after the first ribbon's 22 vertices
        assert_eq!(&mesh.indices[60..63], &[22, 33, 34]);
        // Ribbons sit at +width and -width from the boundary
        assert!((mesh.positions[0][1] - 0.225).abs() < 1e-6);
        assert!((mesh.positions[22][1] + 0.075).abs() < 1e-6);
    }

    #[test]
    fn test_mark_offset_shortens_span() {
        let mark = RoadMark::new(4.0, "solid", 0.15, "white");
        let road = road_with(10.0, Some(mark), None);
        let session = build(&road, &MeshConfig::default());

        let mesh = session.mesh(&MeshKey::mark("9", 1)).unwrap();
        assert_eq!(mesh.vertex_count(), 14);
        assert!((mesh.positions[0][0] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_mark_gets_placeholder() {
        let road = road_with(10.0, None, None);
        let output = build(&road, &MeshConfig::default()).finish(5.0);

        assert_eq!(output.meshes.len(), 2);
        let placeholder = &output.meshes["9_1_mark"];
        assert_eq!(placeholder.vertex_count(), 4);
        assert_eq!(placeholder.positions[3], [5.0, 0.1, 0.0]);
        assert_eq!(placeholder.material.as_deref(), Some(LANE_MARKING_WHITE));
    }

    #[test]
    fn test_later_mark_takes_over_placeholder() {
        let unmarked = Lane::new(0, LaneType::None);
        let mut marked = Lane::new(0, LaneType::None);
        marked.road_mark = Some(RoadMark::new(0.0, "solid solid", 0.15, "yellow"));

        let mut road = Road::new(
            "9",
            20.0,
            vec![CurveSegment::line(0.0, 0.0, 0.0, 0.0, 20.0).unwrap()],
        );
        road.lane_sections = vec![
            LaneSection::new(0.0, vec![], Some(unmarked), vec![]),
            LaneSection::new(10.0, vec![], Some(marked), vec![]),
        ];
        let output = build(&road, &MeshConfig::default()).finish(5.0);

        let mesh = &output.meshes["9_0_mark"];
        assert_eq!(mesh.material.as_deref(), Some(LANE_MARKING_YELLOW));
        // Two ribbons over [10, 20] at 1 m steps
        assert_eq!(mesh.vertex_count(), 44);
        assert!((mesh.positions[0][0] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_mark_span_runs_to_road_end() {
        let mark = RoadMark::new(0.0, "solid", 0.2, "white");
        let left = Lane::new(1, LaneType::Driving)
            .with_width(CubicPoly::constant(0.0, 3.0))
            .with_road_mark(mark);

        let mut road = Road::new(
            "9",
            20.0,
            vec![CurveSegment::line(0.0, 0.0, 0.0, 0.0, 20.0).unwrap()],
        );
        road.lane_sections = vec![
            LaneSection::new(0.0, vec![left.clone()], None, vec![]),
            LaneSection::new(10.0, vec![left], None, vec![]),
        ];
        let config = MeshConfig::default().with_step(5.0);
        let session = build(&road, &config);

        // [0, 20] in 5 samples, then [10, 20] in 3
        let mesh = session.mesh(&MeshKey::mark("9", 1)).unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert!((mesh.positions[4][0] - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_span_too_short_for_dash_falls_back() {
        let mark = RoadMark::new(0.0, "broken", 0.15, "white");
        let road = road_with(2.0, Some(mark), None);
        let output = build(&road, &MeshConfig::default()).finish(5.0);

        let mesh = &output.meshes["9_1_mark"];
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.positions[3], [5.0, 0.15, 0.0]);
    }
}
