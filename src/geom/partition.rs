//! Point-to-piece classification shared by every sampler.
//!
//! The object is the upper half (`y >= 0`) of a ball of radius `R` centred
//! on the origin. Concentric layers of thickness `Lt` are numbered from the
//! outside in; vertical cuts run along X, cross cuts along Z and horizontal
//! cuts stack along Y.

use serde::Serialize;

use crate::params::SimulationParameters;

/// Identity of one produced piece. Two points with equal identities belong
/// to the same piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PieceIdentity {
    /// Layer index, 0 is the outermost shell.
    pub layer: i64,
    /// Vertical cut cell along X.
    pub vertical: i64,
    /// Cross cut cell along Z.
    pub cross: i64,
    /// Horizontal band along Y (always 0 without horizontal cuts).
    pub horizontal: i64,
}

impl PieceIdentity {
    #[must_use]
    pub const fn new(layer: i64, vertical: i64, cross: i64, horizontal: i64) -> Self {
        Self {
            layer,
            vertical,
            cross,
            horizontal,
        }
    }
}

impl std::fmt::Display for PieceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "L{}_V{}_C{}_H{}",
            self.layer, self.vertical, self.cross, self.horizontal
        )
    }
}

/// Euclidean distance of `point` from the centre of the ball.
#[inline]
#[must_use]
pub fn distance_from_center(point: [f64; 3]) -> f64 {
    let [x, y, z] = point;
    (x * x + y * y + z * z).sqrt()
}

/// Whether `point` lies in the resting half-ball.
#[inline]
#[must_use]
pub fn is_inside_object(point: [f64; 3], params: &SimulationParameters) -> bool {
    point[1] >= 0.0 && distance_from_center(point) <= params.radius
}

/// Classifies `point` into its piece, or `None` when it lies outside the object.
#[must_use]
pub fn classify(point: [f64; 3], params: &SimulationParameters) -> Option<PieceIdentity> {
    if !is_inside_object(point, params) {
        return None;
    }
    Some(identity_unchecked(point, distance_from_center(point), params))
}

/// Identity of a point already known to lie inside the object.
#[inline]
pub(crate) fn identity_unchecked(
    point: [f64; 3],
    distance: f64,
    params: &SimulationParameters,
) -> PieceIdentity {
    let [x, y, z] = point;
    let horizontal = params
        .h_spacing()
        .map_or(0, |spacing| floor_index(y / spacing));

    PieceIdentity {
        layer: floor_index((params.radius - distance) / params.layer_thickness),
        vertical: floor_index(x / params.vertical_spacing),
        cross: floor_index(z / params.cross_spacing),
        horizontal,
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn floor_index(value: f64) -> i64 {
    value.floor() as i64
}
