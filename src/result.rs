//! Uitkomst van één simulatierun en de vergelijking met een run zonder
//! horizontale sneden.

use serde::Serialize;

use crate::geom::PieceIdentity;
use crate::params::SimulationParameters;
use crate::stats::{Histogram, Statistics};

/// Eén geproduceerd stuk met het aantal samples dat erin viel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PieceRecord {
    pub identity: PieceIdentity,
    pub count: usize,
    /// `count × voxelvolume` in mm³.
    pub volume: f64,
}

/// Resultaat van een run. Wordt nooit gemuteerd; een nieuwe run levert een
/// nieuw resultaat op.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub parameters: SimulationParameters,
    /// Som van de volumes van de behouden stukken.
    pub total_volume: f64,
    /// Volume van de halve bol, `(2/3)πR³`, ter controle.
    pub theoretical_volume: f64,
    pub piece_count: usize,
    pub mean_volume: f64,
    pub std_dev: f64,
    /// Variatiecoëfficiënt in procenten.
    pub cv: f64,
    pub median_volume: f64,
    pub max_volume: f64,
    pub histogram: Histogram,
    pub pieces: Vec<PieceRecord>,
}

impl SimulationResult {
    /// Stelt een resultaat samen uit de gefilterde stukken en hun statistiek.
    #[must_use]
    pub fn from_parts(
        parameters: SimulationParameters,
        pieces: Vec<PieceRecord>,
        statistics: Statistics,
    ) -> Self {
        Self {
            parameters,
            total_volume: statistics.total,
            theoretical_volume: half_ball_volume(parameters.radius),
            piece_count: statistics.piece_count,
            mean_volume: statistics.mean,
            std_dev: statistics.std_dev,
            cv: statistics.cv,
            median_volume: statistics.median,
            max_volume: statistics.max,
            histogram: statistics.histogram,
            pieces,
        }
    }

    /// Relatieve afwijking van het gesamplede volume t.o.v. de halve bol.
    #[must_use]
    pub fn discretization_error(&self) -> f64 {
        if self.theoretical_volume > 0.0 {
            (self.total_volume - self.theoretical_volume) / self.theoretical_volume
        } else {
            0.0
        }
    }
}

/// Volume van een halve bol met straal `radius`.
#[must_use]
pub fn half_ball_volume(radius: f64) -> f64 {
    (4.0 / 3.0) * std::f64::consts::PI * radius.powi(3) / 2.0
}

/// Effect van horizontale sneden op de variatiecoëfficiënt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CvOutcome {
    /// De huidige run is gelijkmatiger; `delta` is het verschil in procentpunten.
    Improvement { delta: f64 },
    NoBenefit,
}

/// Vergelijking van de huidige run met de basisrun zonder horizontale sneden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CvComparison {
    pub current_cv: f64,
    pub baseline_cv: f64,
    pub outcome: CvOutcome,
}

impl CvComparison {
    #[must_use]
    pub fn between(current: &SimulationResult, baseline: &SimulationResult) -> Self {
        let outcome = if current.cv < baseline.cv {
            CvOutcome::Improvement {
                delta: baseline.cv - current.cv,
            }
        } else {
            CvOutcome::NoBenefit
        };
        Self {
            current_cv: current.cv,
            baseline_cv: baseline.cv,
            outcome,
        }
    }

    #[must_use]
    pub fn is_improvement(&self) -> bool {
        matches!(self.outcome, CvOutcome::Improvement { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;

    fn result_with_cv(cv: f64) -> SimulationResult {
        let mut result = SimulationResult::from_parts(
            SimulationParameters::default(),
            Vec::new(),
            summarize(&[]),
        );
        result.cv = cv;
        result
    }

    #[test]
    fn theoretical_volume_is_half_ball() {
        let result = result_with_cv(0.0);
        let expected = 2.0 / 3.0 * std::f64::consts::PI * 40f64.powi(3);
        assert!((result.theoretical_volume - expected).abs() < 1e-6);
        assert!((result.theoretical_volume - 134_041.3).abs() < 1.0);
    }

    #[test]
    fn lower_cv_reports_improvement() {
        let comparison = CvComparison::between(&result_with_cv(35.0), &result_with_cv(50.0));
        assert!(comparison.is_improvement());
        assert_eq!(comparison.outcome, CvOutcome::Improvement { delta: 15.0 });
    }

    #[test]
    fn equal_or_higher_cv_reports_no_benefit() {
        let equal = CvComparison::between(&result_with_cv(50.0), &result_with_cv(50.0));
        assert_eq!(equal.outcome, CvOutcome::NoBenefit);

        let worse = CvComparison::between(&result_with_cv(60.0), &result_with_cv(50.0));
        assert!(!worse.is_improvement());
    }

    #[test]
    fn empty_result_has_negative_discretization_error() {
        let result = result_with_cv(0.0);
        assert!((result.discretization_error() + 1.0).abs() < 1e-12);
    }
}
