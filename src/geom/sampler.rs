//! Grid quadrature of piece volumes.
//!
//! Exhaustive and deterministic: every point of a 1 mm lattice over
//! `[-R, R]³` inside the half-ball is counted towards its piece. Cost grows
//! with `(2R)³`.

use std::collections::BTreeMap;

use crate::params::{ParamError, SimulationParameters};
use crate::result::{PieceRecord, SimulationResult};
use crate::stats::summarize;

use super::partition::PieceIdentity;
use super::scan::{ScanPolicy, scan_points};

/// Pieces at or below this volume (mm³) are sampling dust and dropped.
pub const DUST_THRESHOLD: f64 = 1.0;

/// Raw sample counts per piece from one lattice walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PieceTally {
    pub counts: BTreeMap<PieceIdentity, usize>,
    pub voxel_volume: f64,
    pub samples: usize,
}

impl PieceTally {
    /// Pieces whose volume exceeds [`DUST_THRESHOLD`], in identity order.
    #[must_use]
    pub fn retained_pieces(&self) -> Vec<PieceRecord> {
        self.counts
            .iter()
            .filter_map(|(identity, &count)| {
                #[allow(clippy::cast_precision_loss)]
                let volume = count as f64 * self.voxel_volume;
                (volume > DUST_THRESHOLD).then_some(PieceRecord {
                    identity: *identity,
                    count,
                    volume,
                })
            })
            .collect()
    }
}

/// Counts lattice samples per piece. `params` are assumed valid.
#[must_use]
pub fn sample_pieces(params: &SimulationParameters) -> PieceTally {
    let policy = ScanPolicy::statistics();
    let mut tally = PieceTally {
        voxel_volume: policy.voxel_volume(),
        ..PieceTally::default()
    };

    scan_points(params, &policy, |_, identity| {
        *tally.counts.entry(identity).or_insert(0) += 1;
        tally.samples += 1;
    });

    log::trace!(
        "sampled {} voxels into {} raw pieces (R={}, H={})",
        tally.samples,
        tally.counts.len(),
        params.radius,
        params.horizontal_cuts
    );
    tally
}

/// Runs one full simulation: sampling, dust filter and statistics.
pub fn simulate(params: &SimulationParameters) -> Result<SimulationResult, ParamError> {
    params.validate()?;

    let tally = sample_pieces(params);
    let pieces = tally.retained_pieces();
    let volumes: Vec<f64> = pieces.iter().map(|piece| piece.volume).collect();
    let statistics = summarize(&volumes);

    log::debug!(
        "simulation R={} Lt={} Sv={} Sc={} H={}: {} pieces, cv {:.2}%",
        params.radius,
        params.layer_thickness,
        params.vertical_spacing,
        params.cross_spacing,
        params.horizontal_cuts,
        statistics.piece_count,
        statistics.cv
    );

    Ok(SimulationResult::from_parts(*params, pieces, statistics))
}
