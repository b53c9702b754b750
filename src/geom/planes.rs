//! Cut-plane and layer-shell layout handed to the renderer.

use serde::Serialize;

use crate::params::SimulationParameters;

use super::color::Rgb;
use super::scan::horizontal_planes;

/// Plane size relative to the radius.
const PLANE_EXTENT_RATIO: f64 = 2.5;

const OUTER_SHELL_HEX: &str = "#b45309";
const EVEN_SHELL_HEX: &str = "#fde68a";
const ODD_SHELL_HEX: &str = "#fdf4dc";

/// Overlay opacity of the onion when the caller does not choose one.
pub const DEFAULT_SHELL_OPACITY: f64 = 0.15;
const MIN_SHELL_OPACITY: f64 = 0.02;
const MAX_SHELL_OPACITY: f64 = 0.9;

/// Offsets of every cut plane that intersects the object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutPlaneLayout {
    /// X positions of the vertical planes.
    pub vertical: Vec<f64>,
    /// Z positions of the cross planes.
    pub cross: Vec<f64>,
    /// Y positions of the horizontal planes.
    pub horizontal: Vec<f64>,
    /// Edge length of the square drawn for each plane.
    pub extent: f64,
}

impl CutPlaneLayout {
    #[must_use]
    pub fn new(params: &SimulationParameters) -> Self {
        Self {
            vertical: symmetric_offsets(params.radius, params.vertical_spacing),
            cross: symmetric_offsets(params.radius, params.cross_spacing),
            horizontal: horizontal_planes(params),
            extent: params.radius * PLANE_EXTENT_RATIO,
        }
    }

    #[must_use]
    pub fn plane_count(&self) -> usize {
        self.vertical.len() + self.cross.len() + self.horizontal.len()
    }
}

/// `i * spacing` for `i` in `-n..=n`, `n = floor(radius / spacing)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn symmetric_offsets(radius: f64, spacing: f64) -> Vec<f64> {
    let n = (radius / spacing).floor() as i64;
    (-n..=n).map(|i| i as f64 * spacing).collect()
}

/// One translucent hemisphere shell of the onion overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerShell {
    pub index: usize,
    pub radius: f64,
    pub outermost: bool,
    /// Amber skin for the outermost shell, alternating pale golds inside.
    pub color: Rgb,
}

impl LayerShell {
    /// Shell opacity for an overlay opacity of `base`: the skin is drawn
    /// three times as opaque as inner shells. Clamped to `[0.02, 0.9]`.
    #[must_use]
    pub fn opacity(&self, base: f64) -> f64 {
        let factor = if self.outermost { 1.5 } else { 0.5 };
        let base = if base.is_finite() { base } else { DEFAULT_SHELL_OPACITY };
        (base * factor).clamp(MIN_SHELL_OPACITY, MAX_SHELL_OPACITY)
    }
}

fn shell_color(index: usize) -> Rgb {
    let hex = if index == 0 {
        OUTER_SHELL_HEX
    } else if index % 2 == 0 {
        EVEN_SHELL_HEX
    } else {
        ODD_SHELL_HEX
    };
    Rgb::from_hex(hex).unwrap_or(Rgb::WHITE)
}

/// Shells at `R - i * Lt` for `i` in `0..ceil(R / Lt)`, skipping non-positive radii.
#[must_use]
pub fn layer_shells(params: &SimulationParameters) -> Vec<LayerShell> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (params.radius / params.layer_thickness).ceil().max(0.0) as usize;
    (0..count)
        .filter_map(|index| {
            #[allow(clippy::cast_precision_loss)]
            let radius = params.radius - index as f64 * params.layer_thickness;
            (radius > 0.0).then_some(LayerShell {
                index,
                radius,
                outermost: index == 0,
                color: shell_color(index),
            })
        })
        .collect()
}
