use super::ledger::LaneLedger;
use super::network::MeshConfig;
use super::session::{MeshKey, MeshSession};
use crate::domain::{Lane, Road};
use crate::geometry::sample_span;
use crate::mesh::{EdgePair, append_ribbon};

/// Build the drivable surface ribbon of every lane of `road` into `session`
///
/// Each lane section is sampled once from its start to the road end; the
/// ledger is evaluated once per sample and shared by all lanes of the section. The center lane gets a surface only
/// when it has a non-zero width.
pub fn build_lane_surfaces(road: &Road, config: &MeshConfig, session: &mut MeshSession) {
    let base_step = road.base_step(config.step);

    for section in &road.lane_sections {
        let (start, end) = road.span_from(section.s);

        let lanes: Vec<&Lane> = section
            .left
            .iter()
            .chain(section.right.iter())
            .chain(section.center.iter().filter(|c| c.has_drivable_width()))
            .collect();

        for lane in &lanes {
            let fallback_width = match lane.width_at(0.0) {
                w if w > 0.0 => w,
                _ => config.placeholder_mark_width,
            };
            session.register(
                &MeshKey::surface(&road.id, lane.id),
                lane.lane_type.surface_material(),
                fallback_width,
            );
        }

        let samples = sample_span(start, end, |s| road.step_at(s, base_step));
        let mut rows: Vec<Vec<EdgePair>> = vec![Vec::with_capacity(samples.len()); lanes.len()];

        for &s in &samples {
            let Some(frame) = road.frame_at(s) else {
                log::debug!("Road {}: no reference line at s={:.3}, sample skipped", road.id, s);
                continue;
            };
            let ledger = LaneLedger::at(section, s - section.s);

            for (row, lane) in rows.iter_mut().zip(&lanes) {
                let Some(edges) = ledger.edges(lane.id) else {
                    continue;
                };
                let (left, right) = edges.lateral();
                row.push(EdgePair {
                    s,
                    left: frame.lateral(left, 0.0),
                    right: frame.lateral(right, 0.0),
                });
            }
        }

        for (row, lane) in rows.iter().zip(&lanes) {
            session.build(&MeshKey::surface(&road.id, lane.id), |mesh| {
                append_ribbon(mesh, row, config.lane_texture_length)
            });
        }
    }
}
