use rayon::prelude::*;

use super::lanes::build_lane_surfaces;
use super::marks::build_lane_marks;
use super::session::{MeshOutput, MeshSession};
use crate::domain::{Road, RoadNetwork};

/// Parameters for lane and mark mesh generation
#[derive(Debug, Clone)]
pub struct MeshConfig {
    /// Base sampling step along the reference line (m)
    pub step: f64,
    /// Visible length of a broken-line dash (m)
    pub dash_length: f64,
    /// Gap between broken-line dashes (m)
    pub gap_length: f64,
    /// Height of marks above the road surface (m)
    pub mark_lift: f64,
    /// Arc-length covered by one texture repeat on lane surfaces (m)
    pub lane_texture_length: f64,
    /// Arc-length covered by one texture repeat on marks (m)
    pub mark_texture_length: f64,
    /// Length of the rectangle substituted for empty meshes (m)
    pub fallback_length: f64,
    /// Width of the placeholder mesh for lanes without a mark (m)
    pub placeholder_mark_width: f64,
    /// Build roads on the rayon pool
    pub parallel: bool,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            step: 1.0,
            dash_length: 3.0,
            gap_length: 3.0,
            mark_lift: 0.01,
            lane_texture_length: 10.0,
            mark_texture_length: 2.0,
            fallback_length: 5.0,
            placeholder_mark_width: 0.1,
            parallel: true,
        }
    }
}

impl MeshConfig {
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Set the broken-line dash and gap lengths
    pub fn with_dashes(mut self, dash_length: f64, gap_length: f64) -> Self {
        self.dash_length = dash_length;
        self.gap_length = gap_length;
        self
    }

    pub fn with_mark_lift(mut self, lift: f64) -> Self {
        self.mark_lift = lift;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Build all lane surfaces and marks of one road into a fresh session
pub fn generate_road(road: &Road, config: &MeshConfig) -> MeshSession {
    let mut session = MeshSession::new();
    build_lane_surfaces(road, config, &mut session);
    build_lane_marks(road, config, &mut session);
    log::debug!("Road {}: {} meshes", road.id, session.len());
    session
}

/// Build every road of the network and collect the finished meshes
///
/// Roads are independent, so each is built into its own session and the
/// sessions are merged afterwards.
pub fn generate_network(network: &RoadNetwork, config: &MeshConfig) -> MeshOutput {
    let sessions: Vec<MeshSession> = if config.parallel {
        network
            .roads
            .par_iter()
            .map(|road| generate_road(road, config))
            .collect()
    } else {
        network
            .roads
            .iter()
            .map(|road| generate_road(road, config))
            .collect()
    };

    let mut merged = MeshSession::new();
    for session in sessions {
        merged.merge(session);
    }

    let output = merged.finish(config.fallback_length);
    log::info!(
        "Generated {} meshes ({} vertices, {} triangles) from {} roads",
        output.meshes.len(),
        output.vertex_count(),
        output.triangle_count(),
        network.roads.len()
    );
    if !output.failures.is_empty() {
        log::warn!("{} lane meshes failed to build", output.failures.len());
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Lane, LaneSection, LaneType, RoadMark};
    use crate::geometry::{CubicPoly, CurveSegment};
    use crate::mesh::is_renderable;
    use crate::mesh::material::{ASPHALT, LANE_MARKING_WHITE, LANE_MARKING_YELLOW};
    use std::f64::consts::{FRAC_PI_2, PI};

    /// 50 m straight, 50 m arc turning 90 degrees left, 50 m straight north
    fn curved_road() -> Road {
        let curvature = PI / 100.0;
        let radius = 1.0 / curvature;
        let arc = CurveSegment::arc(50.0, 50.0, 0.0, 0.0, 50.0, curvature).unwrap();
        let exit = CurveSegment::line(100.0, 50.0 + radius, radius, FRAC_PI_2, 50.0).unwrap();

        let width = CubicPoly::constant(0.0, 3.5);
        let solid_white = RoadMark::new(0.0, "solid", 0.15, "white");
        let left = Lane::new(1, LaneType::Driving)
            .with_width(width)
            .with_road_mark(solid_white.clone());
        let right = Lane::new(-1, LaneType::Driving)
            .with_width(width)
            .with_road_mark(solid_white);
        let center = Lane::new(0, LaneType::None)
            .with_road_mark(RoadMark::new(0.0, "solid solid", 0.15, "yellow"));

        Road::new(
            "1",
            150.0,
            vec![
                CurveSegment::line(0.0, 0.0, 0.0, 0.0, 50.0).unwrap(),
                arc,
                exit,
            ],
        )
        .with_lane_section(LaneSection::new(0.0, vec![left], Some(center), vec![right]))
    }

    #[test]
    fn test_mesh_config_builders() {
        let config = MeshConfig::default()
            .with_step(0.5)
            .with_dashes(4.0, 2.0)
            .with_mark_lift(0.02)
            .with_parallel(false);
        assert_eq!(config.step, 0.5);
        assert_eq!(config.dash_length, 4.0);
        assert_eq!(config.gap_length, 2.0);
        assert_eq!(config.mark_lift, 0.02);
        assert!(!config.parallel);
    }

    #[test]
    fn test_end_to_end_curved_road() {
        let network = RoadNetwork::new(vec![curved_road()]);
        network.validate().unwrap();

        let output = generate_network(&network, &MeshConfig::default());

        let keys: Vec<&str> = output.meshes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["1_-1", "1_-1_mark", "1_0_mark", "1_1", "1_1_mark"]);
        assert!(output.failures.is_empty());
        assert!(output.meshes.values().all(is_renderable));

        assert_eq!(output.meshes["1_1"].material.as_deref(), Some(ASPHALT));
        assert_eq!(
            output.meshes["1_1_mark"].material.as_deref(),
            Some(LANE_MARKING_WHITE)
        );
        assert_eq!(
            output.meshes["1_0_mark"].material.as_deref(),
            Some(LANE_MARKING_YELLOW)
        );

        // Left row of the left lane runs in arc-length order
        let left = &output.meshes["1_1"];
        let rows = left.vertex_count() / 2;
        let u: Vec<f32> = left.tex_coords[..rows].iter().map(|t| t[0]).collect();
        assert!(u.windows(2).all(|w| w[1] > w[0]));
        assert!((u[rows - 1] - 15.0).abs() < 1e-4);

        // The road ends heading north at (50 + r, r + 50); left lane outer edge
        // lies 3.5 m to the west
        let radius = 100.0 / PI;
        let end = left.positions[rows - 1];
        assert!((end[0] as f64 - (50.0 + radius - 3.5)).abs() < 1e-3);
        assert!((end[1] as f64 - (radius + 50.0)).abs() < 1e-3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut second = curved_road();
        second.id = "2".to_string();
        let network = RoadNetwork::new(vec![curved_road(), second]);

        let parallel = generate_network(&network, &MeshConfig::default());
        let sequential = generate_network(&network, &MeshConfig::default().with_parallel(false));

        assert_eq!(parallel.meshes.len(), 10);
        assert_eq!(parallel.meshes, sequential.meshes);
    }

    #[test]
    fn test_connecting_road_sampled_densely() {
        let lane = Lane::new(-1, LaneType::Driving).with_width(CubicPoly::constant(0.0, 3.0));
        let road = Road::new(
            "7",
            5.0,
            vec![CurveSegment::line(0.0, 0.0, 0.0, 0.0, 5.0).unwrap()],
        )
        .with_junction("J1")
        .with_lane_section(LaneSection::new(0.0, vec![], None, vec![lane]));

        let session = generate_road(&road, &MeshConfig::default());
        let output = session.finish(5.0);
        // Base step 0.5 m over 5 m: 11 samples per row
        assert_eq!(output.meshes["7_-1"].vertex_count(), 22);
    }
}
