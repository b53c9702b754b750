//! Geometric sampling kernel: partition function, lattice walks and the two
//! samplers built on top of them.

mod color;
mod metrics;
mod partition;
mod planes;
mod sampler;
mod scan;
mod visual;

pub use color::Rgb;
pub use metrics::{EngineMetrics, EngineTimingReport, TimingBucket};
pub use partition::{PieceIdentity, classify, distance_from_center, is_inside_object};
pub use planes::{CutPlaneLayout, DEFAULT_SHELL_OPACITY, LayerShell, layer_shells};
pub use sampler::{DUST_THRESHOLD, PieceTally, sample_pieces, simulate};
pub use scan::{ScanPolicy, YAnchor, horizontal_planes, scan_points};
pub use visual::{
    ColorNoise, ELEMENT_RATIO, FlatNoise, NOISE_AMPLITUDE, RngNoise, VisualCloud, VisualSample,
    layer_base_color,
};

#[cfg(test)]
mod tests;
