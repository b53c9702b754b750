//! Parameter sweeps en CSV-export van simulatieresultaten.
//!
//! Een export draait ofwel de huidige parameters (`single`), ofwel een
//! vaste sweep over snijafstanden en horizontale sneden (`batch_current`,
//! `batch_full`). Elke run is onafhankelijk; met de `parallel` feature
//! worden ze via rayon verdeeld, de rijvolgorde blijft gelijk.

mod csv;

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;

use crate::geom::simulate;
use crate::params::{ParamError, SimulationParameters};
use crate::result::SimulationResult;

pub use csv::{
    COLUMN_COUNT, CSV_BOM, DELIMITER, ENGLISH_HEADERS, ExportLabels, export_file_name, format_row,
    render_document,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Afstanden (mm) die een sweep doorloopt voor zowel verticale als dwarssneden.
pub const SWEEP_SPACINGS: RangeInclusive<u32> = 3..=7;
/// Aantallen horizontale sneden die een sweep doorloopt.
pub const SWEEP_HORIZONTAL_CUTS: RangeInclusive<u32> = 0..=5;
/// Stralen van de volledige sweep (klein, middel, groot).
pub const FULL_SWEEP_RADII: [f64; 3] = [30.0, 45.0, 60.0];

/// Fouten tijdens het opbouwen van een export.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("onbekende exportmodus: {0}")]
    UnknownMode(String),
    #[error("er is nog geen simulatieresultaat om te exporteren")]
    MissingResult,
    #[error(transparent)]
    Params(#[from] ParamError),
    #[error("verwachtte {expected} kolomkoppen, kreeg {actual}")]
    HeaderCount { expected: usize, actual: usize },
}

/// Welke runs in het exportbestand terechtkomen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Alleen het huidige resultaat.
    Single,
    /// Sweep bij de huidige straal en rokdikte.
    BatchCurrent,
    /// Sweep over de drie presetstralen bij de huidige rokdikte.
    BatchFull,
}

impl ExportMode {
    pub const ALL: [ExportMode; 3] = [
        ExportMode::Single,
        ExportMode::BatchCurrent,
        ExportMode::BatchFull,
    ];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            ExportMode::Single => "single",
            ExportMode::BatchCurrent => "batch_current",
            ExportMode::BatchFull => "batch_full",
        }
    }

    /// Aantal rijen (zonder kopregel) dat deze modus oplevert.
    #[must_use]
    pub fn row_count(self) -> usize {
        let spacings = SWEEP_SPACINGS.count();
        let sweep = spacings * spacings * SWEEP_HORIZONTAL_CUTS.count();
        match self {
            ExportMode::Single => 1,
            ExportMode::BatchCurrent => sweep,
            ExportMode::BatchFull => sweep * FULL_SWEEP_RADII.len(),
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ExportMode {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        ExportMode::ALL
            .into_iter()
            .find(|mode| mode.id() == normalized)
            .ok_or_else(|| ExportError::UnknownMode(s.to_owned()))
    }
}

/// Kwalitatief oordeel over de gelijkmatigheid van een snijpatroon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    VeryHomogeneous,
    Good,
    Uneven,
}

impl Rating {
    /// `cv < 40` is zeer homogeen, `cv > 80` ongelijkmatig, de rest goed.
    #[must_use]
    pub fn classify(cv: f64) -> Self {
        if cv < 40.0 {
            Rating::VeryHomogeneous
        } else if cv > 80.0 {
            Rating::Uneven
        } else {
            Rating::Good
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Rating::VeryHomogeneous => "very_homogeneous",
            Rating::Good => "good",
            Rating::Uneven => "uneven",
        }
    }

    /// Gelokaliseerd label uit `labels`.
    #[must_use]
    pub fn label(self, labels: &ExportLabels) -> &str {
        match self {
            Rating::VeryHomogeneous => &labels.rating_very_homogeneous,
            Rating::Good => &labels.rating_good,
            Rating::Uneven => &labels.rating_uneven,
        }
    }
}

/// Parametersets die `mode` doorloopt, in exportvolgorde: straal, verticale
/// afstand, dwarsafstand en tot slot horizontale sneden.
#[must_use]
pub fn plan_sweep(mode: ExportMode, params: &SimulationParameters) -> Vec<SimulationParameters> {
    let radii: &[f64] = match mode {
        ExportMode::Single => return vec![*params],
        ExportMode::BatchCurrent => std::slice::from_ref(&params.radius),
        ExportMode::BatchFull => &FULL_SWEEP_RADII,
    };

    let mut plan = Vec::with_capacity(mode.row_count());
    for &radius in radii {
        for vertical in SWEEP_SPACINGS {
            for cross in SWEEP_SPACINGS {
                for horizontal_cuts in SWEEP_HORIZONTAL_CUTS {
                    plan.push(SimulationParameters {
                        radius,
                        layer_thickness: params.layer_thickness,
                        vertical_spacing: f64::from(vertical),
                        cross_spacing: f64::from(cross),
                        horizontal_cuts,
                    });
                }
            }
        }
    }
    plan
}

/// Bouwt het volledige CSV-document voor `mode`.
///
/// In `single`-modus wordt `current` hergebruikt; de sweeps draaien elk
/// een verse simulatie.
pub fn run_export(
    mode: ExportMode,
    params: &SimulationParameters,
    current: Option<&SimulationResult>,
    labels: &ExportLabels,
) -> Result<String, ExportError> {
    run_export_with(mode, params, current, labels, simulate)
}

/// Als [`run_export`], met een eigen simulatiefunctie per sweeprun.
pub fn run_export_with<F>(
    mode: ExportMode,
    params: &SimulationParameters,
    current: Option<&SimulationResult>,
    labels: &ExportLabels,
    runner: F,
) -> Result<String, ExportError>
where
    F: Fn(&SimulationParameters) -> Result<SimulationResult, ParamError> + Sync,
{
    labels.validate()?;
    params.validate()?;

    let rows = match mode {
        ExportMode::Single => vec![current.cloned().ok_or(ExportError::MissingResult)?],
        ExportMode::BatchCurrent | ExportMode::BatchFull => {
            let plan = plan_sweep(mode, params);
            log::debug!("export {mode}: {} runs gepland", plan.len());
            run_plan(&plan, &runner)?
        }
    };

    render_document(labels, &rows)
}

#[cfg(feature = "parallel")]
fn run_plan<F>(plan: &[SimulationParameters], runner: &F) -> Result<Vec<SimulationResult>, ExportError>
where
    F: Fn(&SimulationParameters) -> Result<SimulationResult, ParamError> + Sync,
{
    plan.par_iter()
        .map(|params| runner(params).map_err(ExportError::from))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_plan<F>(plan: &[SimulationParameters], runner: &F) -> Result<Vec<SimulationResult>, ExportError>
where
    F: Fn(&SimulationParameters) -> Result<SimulationResult, ParamError> + Sync,
{
    plan.iter()
        .map(|params| runner(params).map_err(ExportError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;

    fn stub_result(params: &SimulationParameters) -> Result<SimulationResult, ParamError> {
        params.validate()?;
        Ok(SimulationResult::from_parts(*params, Vec::new(), summarize(&[])))
    }

    #[test]
    fn parses_modes_by_id() {
        assert_eq!("single".parse::<ExportMode>(), Ok(ExportMode::Single));
        assert_eq!(" Batch-Current ".parse::<ExportMode>(), Ok(ExportMode::BatchCurrent));
        assert_eq!("batch_full".parse::<ExportMode>(), Ok(ExportMode::BatchFull));
        assert_eq!(
            "everything".parse::<ExportMode>(),
            Err(ExportError::UnknownMode("everything".to_owned()))
        );
    }

    #[test]
    fn rating_thresholds() {
        assert_eq!(Rating::classify(39.9), Rating::VeryHomogeneous);
        assert_eq!(Rating::classify(40.0), Rating::Good);
        assert_eq!(Rating::classify(60.0), Rating::Good);
        assert_eq!(Rating::classify(80.0), Rating::Good);
        assert_eq!(Rating::classify(80.1), Rating::Uneven);
        assert_eq!(Rating::classify(0.0), Rating::VeryHomogeneous);
    }

    #[test]
    fn current_sweep_visits_every_combination_once() {
        let params = SimulationParameters::default();
        let plan = plan_sweep(ExportMode::BatchCurrent, &params);
        assert_eq!(plan.len(), 150);
        assert!(plan.iter().all(|p| p.radius == params.radius));
        assert!(plan.iter().all(|p| p.layer_thickness == params.layer_thickness));

        let first = plan[0];
        assert_eq!(
            (first.vertical_spacing, first.cross_spacing, first.horizontal_cuts),
            (3.0, 3.0, 0)
        );
        let second = plan[1];
        assert_eq!(second.horizontal_cuts, 1);
        let last = plan[149];
        assert_eq!(
            (last.vertical_spacing, last.cross_spacing, last.horizontal_cuts),
            (7.0, 7.0, 5)
        );
    }

    #[test]
    fn full_sweep_covers_preset_radii() {
        let params = SimulationParameters::default();
        let plan = plan_sweep(ExportMode::BatchFull, &params);
        assert_eq!(plan.len(), 450);
        assert_eq!(plan[0].radius, 30.0);
        assert_eq!(plan[150].radius, 45.0);
        assert_eq!(plan[449].radius, 60.0);
    }

    #[test]
    fn single_export_needs_a_result() {
        let params = SimulationParameters::default();
        let labels = ExportLabels::default();
        assert_eq!(
            run_export_with(ExportMode::Single, &params, None, &labels, stub_result),
            Err(ExportError::MissingResult)
        );
    }

    #[test]
    fn batch_export_has_one_line_per_run() {
        let params = SimulationParameters::default();
        let labels = ExportLabels::default();
        for mode in [ExportMode::BatchCurrent, ExportMode::BatchFull] {
            let document = run_export_with(mode, &params, None, &labels, stub_result)
                .expect("export");
            let lines: Vec<&str> = document.lines().collect();
            assert_eq!(lines.len(), mode.row_count() + 1);
            assert!(lines[1..]
                .iter()
                .all(|line| line.split(DELIMITER).count() == COLUMN_COUNT));
        }
    }

    #[test]
    fn runner_errors_abort_the_export() {
        let params = SimulationParameters::default();
        let labels = ExportLabels::default();
        let failing = |_: &SimulationParameters| -> Result<SimulationResult, ParamError> {
            Err(ParamError::NonFinite { name: "radius" })
        };
        let outcome = run_export_with(ExportMode::BatchCurrent, &params, None, &labels, failing);
        assert_eq!(
            outcome,
            Err(ExportError::Params(ParamError::NonFinite { name: "radius" }))
        );
    }
}
