mod test_partition_basic;

use crate::params::SimulationParameters;

/// The initial on-screen parameters with `horizontal_cuts` overridden.
pub(crate) fn default_params(horizontal_cuts: u32) -> SimulationParameters {
    SimulationParameters::default().with_horizontal_cuts(horizontal_cuts)
}

pub(crate) fn params(
    radius: f64,
    layer_thickness: f64,
    spacing: f64,
    horizontal_cuts: u32,
) -> SimulationParameters {
    SimulationParameters::new(radius, layer_thickness, spacing, spacing, horizontal_cuts)
        .expect("valid test parameters")
}
