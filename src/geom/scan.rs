//! Regular lattice walk over the object's bounding volume.
//!
//! Both samplers visit the same kind of lattice and share the partition
//! function; they differ only in the [`ScanPolicy`]: lattice step, where the
//! Y axis is anchored and whether samples next to a cut plane are dropped.

use crate::params::SimulationParameters;

use super::partition::{PieceIdentity, distance_from_center, identity_unchecked};

/// Where the first lattice row along Y sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YAnchor {
    /// `y` starts at `-R` like `x` and `z`; rows below the board are skipped.
    Bounds,
    /// `y` starts on the cutting board (`y = 0`).
    Board,
}

/// Resolution and exclusion rules for one lattice walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanPolicy {
    pub step: f64,
    pub y_anchor: YAnchor,
    /// Half-width of the band around each cut plane in which samples are dropped.
    pub kerf: Option<f64>,
}

impl ScanPolicy {
    /// Fixed 1 mm quadrature grid used for volume statistics.
    pub const STATISTICS_STEP: f64 = 1.0;
    pub const VISUAL_TARGET_COUNT: f64 = 125_000.0;
    pub const VISUAL_MIN_STEP: f64 = 0.25;
    pub const VISUAL_MIN_KERF: f64 = 0.3;
    pub const VISUAL_KERF_RATIO: f64 = 0.25;

    #[must_use]
    pub const fn statistics() -> Self {
        Self {
            step: Self::STATISTICS_STEP,
            y_anchor: YAnchor::Bounds,
            kerf: None,
        }
    }

    /// Adaptive policy aiming at roughly 125k samples for the half-ball.
    #[must_use]
    pub fn visual(params: &SimulationParameters) -> Self {
        let volume = (2.0 / 3.0) * std::f64::consts::PI * params.radius.powi(3);
        let step = (volume / Self::VISUAL_TARGET_COUNT)
            .cbrt()
            .max(Self::VISUAL_MIN_STEP);
        Self {
            step,
            y_anchor: YAnchor::Board,
            kerf: Some(Self::VISUAL_MIN_KERF.max(step * Self::VISUAL_KERF_RATIO)),
        }
    }

    /// Volume represented by one lattice sample.
    #[must_use]
    pub fn voxel_volume(&self) -> f64 {
        self.step.powi(3)
    }
}

/// Visits every lattice point inside the object that survives the policy,
/// in x-major, then y, then z order.
pub fn scan_points<F>(params: &SimulationParameters, policy: &ScanPolicy, mut visit: F)
where
    F: FnMut([f64; 3], PieceIdentity),
{
    let radius = params.radius;
    let step = policy.step;
    let span = lattice_count(2.0 * radius, step);
    let (y_origin, y_count) = match policy.y_anchor {
        YAnchor::Bounds => (-radius, span),
        YAnchor::Board => (0.0, lattice_count(radius, step)),
    };

    for ix in 0..span {
        let x = lattice_coord(-radius, ix, step);
        if let Some(kerf) = policy.kerf {
            if near_periodic_plane(x, params.vertical_spacing, kerf) {
                continue;
            }
        }
        for iy in 0..y_count {
            let y = lattice_coord(y_origin, iy, step);
            if y < 0.0 {
                continue;
            }
            if let Some(kerf) = policy.kerf {
                if near_horizontal_plane(y, params, kerf) {
                    continue;
                }
            }
            for iz in 0..span {
                let z = lattice_coord(-radius, iz, step);
                let point = [x, y, z];
                let distance = distance_from_center(point);
                if distance > radius {
                    continue;
                }
                if let Some(kerf) = policy.kerf {
                    if near_periodic_plane(z, params.cross_spacing, kerf) {
                        continue;
                    }
                }
                visit(point, identity_unchecked(point, distance, params));
            }
        }
    }
}

/// Heights of the horizontal cut planes (`k * R / (H + 1)` for `k` in `1..=H`).
#[must_use]
pub fn horizontal_planes(params: &SimulationParameters) -> Vec<f64> {
    match params.h_spacing() {
        Some(spacing) => (1..=params.horizontal_cuts)
            .map(|k| f64::from(k) * spacing)
            .collect(),
        None => Vec::new(),
    }
}

/// Whether `y` lies strictly closer than `kerf` to one of the `H` horizontal
/// planes. Only the nearest plane is checked, so the cost does not grow with `H`.
#[inline]
fn near_horizontal_plane(y: f64, params: &SimulationParameters, kerf: f64) -> bool {
    let Some(spacing) = params.h_spacing() else {
        return false;
    };
    let nearest = (y / spacing)
        .round()
        .clamp(1.0, f64::from(params.horizontal_cuts));
    (y - nearest * spacing).abs() < kerf
}

/// Whether `coord` lies strictly closer than `kerf` to a plane at a multiple of `spacing`.
#[inline]
fn near_periodic_plane(coord: f64, spacing: f64, kerf: f64) -> bool {
    let nearest = (coord / spacing).round() * spacing;
    (coord - nearest).abs() < kerf
}

/// Number of lattice points `origin + i * step` with `i * step <= extent`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lattice_count(extent: f64, step: f64) -> usize {
    if extent < 0.0 || step <= 0.0 {
        return 0;
    }
    ((extent / step) + 1e-9).floor() as usize + 1
}

#[inline]
#[allow(clippy::cast_precision_loss)]
fn lattice_coord(origin: f64, index: usize, step: f64) -> f64 {
    origin + index as f64 * step
}
