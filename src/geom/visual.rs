//! Adaptive point cloud for the exploded view.
//!
//! The lattice step is chosen so the half-ball holds about 125k samples.
//! Samples inside the kerf band around any cut plane are dropped, which
//! leaves visible gaps between pieces before any explosion is applied.
//! Colour noise is drawn from an injected [`ColorNoise`] and never feeds
//! back into geometry.

use rand::Rng;
use serde::Serialize;

use crate::params::{ExplosionControls, SimulationParameters};

use super::color::Rgb;
use super::partition::PieceIdentity;
use super::scan::{ScanPolicy, scan_points};

/// Rendered element edge length relative to the lattice step.
pub const ELEMENT_RATIO: f64 = 0.92;
/// Peak-to-peak lightness jitter applied per sample.
pub const NOISE_AMPLITUDE: f64 = 0.15;

const OUTER_LAYER_HEX: &str = "#d97706";
const INNER_LAYER_HEX: &str = "#fef3c7";

/// Source of per-sample lightness jitter.
pub trait ColorNoise {
    /// Lightness offset for the next sample.
    fn lightness_offset(&mut self) -> f64;
}

/// Uniform jitter in `[-0.075, 0.075)` drawn from any [`Rng`].
#[derive(Debug)]
pub struct RngNoise<R>(pub R);

impl<R: Rng> ColorNoise for RngNoise<R> {
    fn lightness_offset(&mut self) -> f64 {
        (self.0.random::<f64>() - 0.5) * NOISE_AMPLITUDE
    }
}

/// No jitter at all; colours depend only on the layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatNoise;

impl ColorNoise for FlatNoise {
    fn lightness_offset(&mut self) -> f64 {
        0.0
    }
}

/// One sample of the exploded-view cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualSample {
    pub position: [f64; 3],
    pub identity: PieceIdentity,
    pub color: Rgb,
}

/// Sample cloud for one set of geometry parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualCloud {
    params: SimulationParameters,
    step: f64,
    cut_gap: f64,
    samples: Vec<VisualSample>,
}

impl VisualCloud {
    /// Samples the cloud. `params` are assumed valid.
    pub fn sample<N: ColorNoise + ?Sized>(params: &SimulationParameters, noise: &mut N) -> Self {
        let policy = ScanPolicy::visual(params);
        let outer = layer_base_color(0);
        let mut samples = Vec::new();

        scan_points(params, &policy, |position, identity| {
            let base = if identity.layer == 0 {
                outer
            } else {
                layer_base_color(identity.layer)
            };
            samples.push(VisualSample {
                position,
                identity,
                color: base.offset_lightness(noise.lightness_offset()),
            });
        });

        log::debug!(
            "visual cloud: {} samples at step {:.3} mm (kerf {:.3} mm)",
            samples.len(),
            policy.step,
            policy.kerf.unwrap_or(0.0)
        );

        Self {
            params: *params,
            step: policy.step,
            cut_gap: policy.kerf.unwrap_or(0.0),
            samples,
        }
    }

    #[must_use]
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    #[must_use]
    pub fn samples(&self) -> &[VisualSample] {
        &self.samples
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Lattice step in mm.
    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Edge length of one rendered element.
    #[must_use]
    pub fn element_size(&self) -> f64 {
        self.step * ELEMENT_RATIO
    }

    /// Half-width of the kerf band that was carved out.
    #[must_use]
    pub fn cut_gap(&self) -> f64 {
        self.cut_gap
    }

    /// Displaced position of every sample; the cloud itself is untouched.
    #[must_use]
    pub fn explode(&self, controls: ExplosionControls) -> Vec<[f64; 3]> {
        let transform = Explosion::new(&self.params, controls);
        self.samples
            .iter()
            .map(|sample| transform.apply(sample))
            .collect()
    }

    /// Exploded positions flattened to `[x0, y0, z0, x1, ...]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn positions_flat(&self, controls: ExplosionControls) -> Vec<f32> {
        let transform = Explosion::new(&self.params, controls);
        let mut flat = Vec::with_capacity(self.samples.len() * 3);
        for sample in &self.samples {
            let [x, y, z] = transform.apply(sample);
            flat.extend_from_slice(&[x as f32, y as f32, z as f32]);
        }
        flat
    }

    /// Sample colours flattened to `[r0, g0, b0, r1, ...]`.
    #[must_use]
    pub fn colors_flat(&self) -> Vec<f32> {
        self.samples
            .iter()
            .flat_map(|sample| sample.color.to_array_f32())
            .collect()
    }
}

/// Per-sample displacement keyed by piece identity.
#[derive(Debug, Clone, Copy)]
struct Explosion {
    step_x: f64,
    step_y: f64,
    step_z: f64,
    lift_per_layer: f64,
}

impl Explosion {
    fn new(params: &SimulationParameters, controls: ExplosionControls) -> Self {
        let h_spacing = params.h_spacing().unwrap_or(params.radius);
        Self {
            step_x: params.vertical_spacing * controls.spread,
            step_y: h_spacing * controls.spread,
            step_z: params.cross_spacing * controls.spread,
            lift_per_layer: params.layer_thickness * 2.0 * controls.lift,
        }
    }

    #[inline]
    #[allow(clippy::cast_precision_loss)]
    fn apply(&self, sample: &VisualSample) -> [f64; 3] {
        let id = sample.identity;
        let [x, y, z] = sample.position;
        [
            x + id.vertical as f64 * self.step_x,
            y + id.horizontal as f64 * self.step_y + id.layer as f64 * self.lift_per_layer,
            z + id.cross as f64 * self.step_z,
        ]
    }
}

/// Base colour of a layer before noise: amber outer skin, cream inner
/// layers fading to white with depth.
#[must_use]
pub fn layer_base_color(layer: i64) -> Rgb {
    let outer = Rgb::from_hex(OUTER_LAYER_HEX).unwrap_or(Rgb::WHITE);
    if layer <= 0 {
        return outer;
    }
    let inner = Rgb::from_hex(INNER_LAYER_HEX).unwrap_or(Rgb::WHITE);
    #[allow(clippy::cast_precision_loss)]
    let t = ((layer - 1) as f64 * 0.1).min(1.0);
    inner.lerp(Rgb::WHITE, t)
}
