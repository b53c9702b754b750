#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod export;
pub mod geom;
pub mod params;
pub mod result;
pub mod stats;

use std::fmt;

use export::{ExportError, ExportLabels, ExportMode};
use geom::{
    CutPlaneLayout, EngineMetrics, EngineTimingReport, RngNoise, TimingBucket, VisualCloud,
    layer_shells, simulate,
};
use params::{ExplosionControls, ParamError, ParameterKind, SimulationParameters, SizePreset};
use rand::SeedableRng;
use rand::rngs::StdRng;
use result::{CvComparison, SimulationResult};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads)
        .await
        .map_err(|err| JsError::new(&format!("kon rayon threadpool niet initialiseren: {err}")))
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Sliderbeschrijving voor de UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct ParameterExport {
    id: &'static str,
    min: f64,
    max: f64,
    step: f64,
    value: f64,
}

#[derive(Debug, Serialize)]
struct LayerShellExport {
    #[serde(flatten)]
    shell: geom::LayerShell,
    opacity: f64,
}

#[derive(Debug, Serialize)]
struct LayerShellsResponse {
    shells: Vec<LayerShellExport>,
}

/// Publiek toegangspunt voor de presentatielaag.
///
/// Houdt de huidige parameters, het laatste resultaat (plus de basisrun in
/// vergelijkingsmodus) en de gesamplede voxelwolk voor de explosieweergave.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    params: SimulationParameters,
    compare_mode: bool,
    last_result: Option<SimulationResult>,
    comparison: Option<SimulationResult>,
    result_dirty: bool,
    cloud: Option<VisualCloud>,
    metrics: EngineMetrics,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            params: SimulationParameters::default(),
            compare_mode: false,
            last_result: None,
            comparison: None,
            result_dirty: true,
            cloud: None,
            metrics: EngineMetrics::default(),
        }
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Haal alle parameters met bereik en huidige waarde op voor UI-generatie.
    #[wasm_bindgen]
    pub fn get_parameters(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.parameter_table())
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Stel een parameter in op basis van id of alias. De waarde wordt
    /// begrensd en op de stapgrootte afgerond; de toegepaste waarde komt terug.
    #[wasm_bindgen]
    pub fn set_parameter(&mut self, id_or_name: &str, value: f64) -> Result<f64, JsValue> {
        if !value.is_finite() {
            return Err(js_error("parameterwaarde moet een eindig getal zijn"));
        }
        let kind: ParameterKind = id_or_name.parse().map_err(to_js_error)?;
        Ok(self.apply_parameter(kind, value))
    }

    /// Zet de straal op die van een groottepreset (`small`, `medium`, `large`).
    #[wasm_bindgen]
    pub fn apply_preset(&mut self, name: &str) -> Result<f64, JsValue> {
        let preset: SizePreset = name.parse().map_err(to_js_error)?;
        Ok(self.apply_parameter(ParameterKind::Radius, preset.radius()))
    }

    /// Schakel de vergelijking met een run zonder horizontale sneden in of uit.
    #[wasm_bindgen]
    pub fn set_compare_mode(&mut self, enabled: bool) {
        if self.compare_mode != enabled {
            self.compare_mode = enabled;
            self.result_dirty = true;
        }
    }

    /// Draai de simulatie voor de huidige parameters.
    #[wasm_bindgen]
    pub fn evaluate(&mut self) -> Result<(), JsValue> {
        self.run_evaluation().map_err(to_js_error)
    }

    /// Resultaat van de laatste evaluatie.
    #[wasm_bindgen]
    pub fn get_result(&self) -> Result<JsValue, JsValue> {
        let result = self
            .result()
            .ok_or_else(|| js_error("simulatie is nog niet geëvalueerd"))?;
        serde_wasm_bindgen::to_value(result).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Basisrun zonder horizontale sneden, of `null` buiten vergelijkingsmodus.
    #[wasm_bindgen]
    pub fn get_comparison(&self) -> Result<JsValue, JsValue> {
        if self.result_dirty {
            return Err(js_error("simulatie is nog niet geëvalueerd"));
        }
        match self.comparison_result() {
            Some(baseline) => serde_wasm_bindgen::to_value(baseline)
                .map_err(|err| JsError::new(&err.to_string()).into()),
            None => Ok(JsValue::NULL),
        }
    }

    /// CV-verschil tussen de huidige run en de basisrun.
    #[wasm_bindgen]
    pub fn get_cv_comparison(&self) -> Result<JsValue, JsValue> {
        let comparison = self
            .cv_comparison()
            .ok_or_else(|| js_error("er is geen vergelijkingsresultaat beschikbaar"))?;
        serde_wasm_bindgen::to_value(&comparison)
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Sample de voxelwolk voor de explosieweergave. Zonder `seed` komt de
    /// kleurruis uit de entropiebron van het platform.
    #[wasm_bindgen]
    pub fn sample_voxels(&mut self, seed: Option<u32>) -> usize {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(u64::from(seed)),
            None => StdRng::from_os_rng(),
        };
        self.sample_cloud(&mut RngNoise(rng))
    }

    /// Aantal voxels in de huidige wolk (0 als er nog niet gesampled is).
    #[wasm_bindgen]
    pub fn voxel_count(&self) -> usize {
        self.cloud.as_ref().map_or(0, VisualCloud::len)
    }

    /// Ribbe van één weergegeven voxel in mm.
    #[wasm_bindgen]
    pub fn voxel_size(&self) -> f64 {
        self.cloud.as_ref().map_or(0.0, VisualCloud::element_size)
    }

    /// Posities na explosie als `[x0, y0, z0, x1, ...]`.
    #[wasm_bindgen]
    pub fn get_voxel_positions(&mut self, spread: f64, lift: f64) -> Result<Vec<f32>, JsValue> {
        let controls = ExplosionControls::new(spread, lift);
        let cloud = self
            .cloud
            .as_ref()
            .ok_or_else(|| js_error("er zijn nog geen voxels gesampled"))?;
        Ok(self
            .metrics
            .time(TimingBucket::Explosion, || cloud.positions_flat(controls)))
    }

    /// Kleuren als `[r0, g0, b0, r1, ...]`.
    #[wasm_bindgen]
    pub fn get_voxel_colors(&self) -> Result<Vec<f32>, JsValue> {
        self.cloud
            .as_ref()
            .map(VisualCloud::colors_flat)
            .ok_or_else(|| js_error("er zijn nog geen voxels gesampled"))
    }

    /// Posities van alle snijvlakken voor de overlay.
    #[wasm_bindgen]
    pub fn get_cut_planes(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&CutPlaneLayout::new(&self.params))
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Doorzichtige rokschillen voor de overlay, met kleur en dekking per
    /// schil. Zonder `opacity` geldt de standaarddekking van de ui.
    #[wasm_bindgen]
    pub fn get_layer_shells(&self, opacity: Option<f64>) -> Result<JsValue, JsValue> {
        let response = LayerShellsResponse {
            shells: self.layer_shell_table(opacity.unwrap_or(geom::DEFAULT_SHELL_OPACITY)),
        };
        serde_wasm_bindgen::to_value(&response).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Bouw een CSV-document (`single`, `batch_current` of `batch_full`).
    /// `labels` mag ontbreken; dan worden Engelse kolomkoppen gebruikt.
    #[wasm_bindgen]
    pub fn export_csv(&mut self, mode: &str, labels: JsValue) -> Result<String, JsValue> {
        let mode: ExportMode = mode.parse().map_err(to_js_error)?;
        let labels: ExportLabels = if labels.is_undefined() || labels.is_null() {
            ExportLabels::default()
        } else {
            serde_wasm_bindgen::from_value(labels).map_err(to_js_error)?
        };
        self.export_document(mode, &labels).map_err(to_js_error)
    }

    /// Bestandsnaam voor een export op de huidige (UTC) datum.
    #[wasm_bindgen]
    pub fn export_file_name(&self, lang: &str, mode: &str) -> Result<String, JsValue> {
        let mode: ExportMode = mode.parse().map_err(to_js_error)?;
        let today = time::OffsetDateTime::now_utc().date();
        Ok(export::export_file_name(lang, mode, today))
    }
}

impl Engine {
    /// Huidige parameters.
    #[must_use]
    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    #[must_use]
    pub fn compare_mode(&self) -> bool {
        self.compare_mode
    }

    /// Laatste resultaat, `None` zolang er wijzigingen niet geëvalueerd zijn.
    #[must_use]
    pub fn result(&self) -> Option<&SimulationResult> {
        if self.result_dirty {
            None
        } else {
            self.last_result.as_ref()
        }
    }

    #[must_use]
    pub fn comparison_result(&self) -> Option<&SimulationResult> {
        if self.result_dirty {
            None
        } else {
            self.comparison.as_ref()
        }
    }

    #[must_use]
    pub fn cv_comparison(&self) -> Option<CvComparison> {
        Some(CvComparison::between(
            self.result()?,
            self.comparison_result()?,
        ))
    }

    #[must_use]
    pub fn cloud(&self) -> Option<&VisualCloud> {
        self.cloud.as_ref()
    }

    #[must_use]
    pub fn timing_report(&self) -> Option<EngineTimingReport> {
        self.metrics.end()
    }

    /// Stelt een parameter in zonder JS-tussenlaag; geeft de toegepaste waarde terug.
    #[allow(clippy::float_cmp)]
    pub fn apply_parameter(&mut self, kind: ParameterKind, value: f64) -> f64 {
        let snapped = kind.snap(value);
        if self.params.get(kind) != snapped {
            self.params.set(kind, snapped);
            self.result_dirty = true;
            self.cloud = None;
        }
        self.params.get(kind)
    }

    /// Evalueert de huidige parameters als er iets gewijzigd is.
    pub fn run_evaluation(&mut self) -> Result<(), ParamError> {
        if !self.result_dirty {
            return Ok(());
        }

        let params = self.params;
        self.metrics.begin();
        let result = self
            .metrics
            .time(TimingBucket::VolumeSampling, || simulate(&params))?;

        let comparison = if self.compare_mode {
            let baseline = params.with_horizontal_cuts(0);
            Some(
                self.metrics
                    .time(TimingBucket::Comparison, || simulate(&baseline))?,
            )
        } else {
            None
        };

        debug_log!(
            "evaluatie: {} stukken, cv {:.1}% (vergelijking: {})",
            result.piece_count,
            result.cv,
            comparison.is_some()
        );

        self.last_result = Some(result);
        self.comparison = comparison;
        self.result_dirty = false;
        Ok(())
    }

    /// Samplet de voxelwolk met een eigen ruisbron en geeft het aantal voxels terug.
    pub fn sample_cloud<N: geom::ColorNoise + ?Sized>(&mut self, noise: &mut N) -> usize {
        let params = self.params;
        let cloud = self
            .metrics
            .time(TimingBucket::VisualSampling, || VisualCloud::sample(&params, noise));
        let count = cloud.len();
        debug_log!("voxelwolk: {count} voxels, stap {:.3} mm", cloud.step());
        self.cloud = Some(cloud);
        count
    }

    /// CSV-document voor `mode`; `single` vereist een geëvalueerd resultaat.
    pub fn export_document(
        &mut self,
        mode: ExportMode,
        labels: &ExportLabels,
    ) -> Result<String, ExportError> {
        let params = self.params;
        let current = if self.result_dirty {
            None
        } else {
            self.last_result.as_ref()
        };
        self.metrics.time(TimingBucket::BatchSweep, || {
            export::run_export(mode, &params, current, labels)
        })
    }

    fn layer_shell_table(&self, opacity: f64) -> Vec<LayerShellExport> {
        layer_shells(&self.params)
            .into_iter()
            .map(|shell| LayerShellExport {
                opacity: shell.opacity(opacity),
                shell,
            })
            .collect()
    }

    fn parameter_table(&self) -> Vec<ParameterExport> {
        ParameterKind::ALL
            .into_iter()
            .map(|kind| {
                let range = kind.range();
                ParameterExport {
                    id: kind.id(),
                    min: range.min,
                    max: range.max,
                    step: range.step,
                    value: self.params.get(kind),
                }
            })
            .collect()
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::{Engine, ParameterKind};
    use crate::geom::FlatNoise;
    use crate::params::ExplosionControls;

    #[test]
    fn parameter_table_lists_every_parameter() {
        let engine = Engine::new();
        let table = engine.parameter_table();
        let ids: Vec<&str> = table.iter().map(|entry| entry.id).collect();
        assert_eq!(
            ids,
            vec![
                "radius",
                "layer_thickness",
                "vertical_spacing",
                "cross_spacing",
                "horizontal_cuts"
            ]
        );
        assert_eq!(table[0].value, 40.0);
        assert_eq!((table[0].min, table[0].max, table[0].step), (20.0, 70.0, 1.0));
    }

    #[test]
    fn layer_shell_table_scales_opacity_per_shell() {
        let engine = Engine::new();
        let table = engine.layer_shell_table(0.2);
        assert_eq!(table.len(), 14);
        assert!(table[0].shell.outermost);
        assert!((table[0].opacity - 0.3).abs() < 1e-12);
        assert!(table[1..].iter().all(|entry| (entry.opacity - 0.1).abs() < 1e-12));
    }

    #[test]
    fn unchanged_parameter_keeps_result_fresh() {
        let mut engine = Engine::new();
        engine.apply_parameter(ParameterKind::Radius, 20.0);
        engine.run_evaluation().expect("evaluate");
        assert!(engine.result().is_some());

        assert_eq!(engine.apply_parameter(ParameterKind::Radius, 20.2), 20.0);
        assert!(engine.result().is_some());

        assert_eq!(engine.apply_parameter(ParameterKind::HorizontalCuts, 2.0), 2.0);
        assert!(engine.result().is_none());
    }

    #[test]
    fn parameter_change_drops_sampled_cloud() {
        let mut engine = Engine::new();
        engine.apply_parameter(ParameterKind::Radius, 20.0);
        assert!(engine.sample_cloud(&mut FlatNoise) > 0);
        assert!(engine.cloud().is_some());

        engine.apply_parameter(ParameterKind::LayerThickness, 4.0);
        assert!(engine.cloud().is_none());
        assert_eq!(engine.voxel_count(), 0);
        assert!(engine.get_voxel_positions(0.2, 0.1).is_err());
    }

    #[test]
    fn voxel_buffers_match_cloud() {
        let mut engine = Engine::new();
        engine.apply_parameter(ParameterKind::Radius, 20.0);
        let count = engine.sample_cloud(&mut FlatNoise);
        assert_eq!(engine.voxel_count(), count);

        let positions = engine.get_voxel_positions(0.8, 0.8).expect("positions");
        assert_eq!(positions.len(), count * 3);
        let expected = engine
            .cloud()
            .expect("cloud")
            .positions_flat(ExplosionControls::new(0.5, 0.3));
        assert_eq!(positions, expected);
        assert_eq!(engine.get_voxel_colors().expect("colors").len(), count * 3);
    }
}
