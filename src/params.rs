//! Invoerparameters voor een snijsimulatie, inclusief de bereiktabel die de
//! presentatielaag voor zijn sliders gebruikt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fouten bij het valideren of opzoeken van parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// Een parameter is NaN of oneindig.
    #[error("parameter `{name}` moet een eindig getal zijn")]
    NonFinite { name: &'static str },
    /// Een parameter die strikt positief moet zijn, is dat niet.
    #[error("parameter `{name}` moet groter dan 0 zijn (kreeg {value})")]
    NotPositive { name: &'static str, value: f64 },
    /// Onbekende parameternaam of -id.
    #[error("onbekende parameter: {0}")]
    UnknownParameter(String),
    /// Onbekende groottepreset.
    #[error("onbekende preset: {0}")]
    UnknownPreset(String),
}

/// Parameters van één simulatierun. Onveranderlijk zodra een run start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Straal van de (halve) ui in mm.
    pub radius: f64,
    /// Dikte van één rok in mm.
    pub layer_thickness: f64,
    /// Afstand tussen verticale sneden (langs X) in mm.
    pub vertical_spacing: f64,
    /// Afstand tussen dwarssneden (langs Z) in mm.
    pub cross_spacing: f64,
    /// Aantal horizontale sneden (evenwijdig aan de snijplank).
    pub horizontal_cuts: u32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            radius: ParameterKind::Radius.default_value(),
            layer_thickness: ParameterKind::LayerThickness.default_value(),
            vertical_spacing: ParameterKind::VerticalSpacing.default_value(),
            cross_spacing: ParameterKind::CrossSpacing.default_value(),
            horizontal_cuts: 0,
        }
    }
}

impl SimulationParameters {
    /// Bouwt een gevalideerde parameterset.
    pub fn new(
        radius: f64,
        layer_thickness: f64,
        vertical_spacing: f64,
        cross_spacing: f64,
        horizontal_cuts: u32,
    ) -> Result<Self, ParamError> {
        let params = Self {
            radius,
            layer_thickness,
            vertical_spacing,
            cross_spacing,
            horizontal_cuts,
        };
        params.validate()?;
        Ok(params)
    }

    /// Controleert de invarianten die delingen door nul voorkomen.
    pub fn validate(&self) -> Result<(), ParamError> {
        require_positive("radius", self.radius)?;
        require_positive("layer_thickness", self.layer_thickness)?;
        require_positive("vertical_spacing", self.vertical_spacing)?;
        require_positive("cross_spacing", self.cross_spacing)?;
        Ok(())
    }

    /// Kopie met een ander aantal horizontale sneden (vergelijkingsmodus).
    #[must_use]
    pub fn with_horizontal_cuts(self, horizontal_cuts: u32) -> Self {
        Self {
            horizontal_cuts,
            ..self
        }
    }

    /// Afstand tussen horizontale snijvlakken, of `None` zonder horizontale sneden.
    #[must_use]
    pub fn h_spacing(&self) -> Option<f64> {
        (self.horizontal_cuts > 0).then(|| self.radius / (f64::from(self.horizontal_cuts) + 1.0))
    }

    /// Leest een parameter uit als `f64`.
    #[must_use]
    pub fn get(&self, kind: ParameterKind) -> f64 {
        match kind {
            ParameterKind::Radius => self.radius,
            ParameterKind::LayerThickness => self.layer_thickness,
            ParameterKind::VerticalSpacing => self.vertical_spacing,
            ParameterKind::CrossSpacing => self.cross_spacing,
            ParameterKind::HorizontalCuts => f64::from(self.horizontal_cuts),
        }
    }

    /// Zet een parameter zonder bereikcontrole; `value` wordt verondersteld
    /// al geklemd te zijn.
    pub fn set(&mut self, kind: ParameterKind, value: f64) {
        match kind {
            ParameterKind::Radius => self.radius = value,
            ParameterKind::LayerThickness => self.layer_thickness = value,
            ParameterKind::VerticalSpacing => self.vertical_spacing = value,
            ParameterKind::CrossSpacing => self.cross_spacing = value,
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            ParameterKind::HorizontalCuts => self.horizontal_cuts = value.max(0.0).round() as u32,
        }
    }
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NonFinite { name });
    }
    if value <= 0.0 {
        return Err(ParamError::NotPositive { name, value });
    }
    Ok(())
}

/// Instelbare parameters met hun sliderbereik.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    Radius,
    LayerThickness,
    VerticalSpacing,
    CrossSpacing,
    HorizontalCuts,
}

/// Bereik en standaardwaarde van één parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 5] = [
        ParameterKind::Radius,
        ParameterKind::LayerThickness,
        ParameterKind::VerticalSpacing,
        ParameterKind::CrossSpacing,
        ParameterKind::HorizontalCuts,
    ];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Radius => "radius",
            Self::LayerThickness => "layer_thickness",
            Self::VerticalSpacing => "vertical_spacing",
            Self::CrossSpacing => "cross_spacing",
            Self::HorizontalCuts => "horizontal_cuts",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Radius => &["r", "onion_radius"],
            Self::LayerThickness => &["layer", "lt"],
            Self::VerticalSpacing => &["vertical", "sv"],
            Self::CrossSpacing => &["cross", "sc"],
            Self::HorizontalCuts => &["horizontal", "h"],
        }
    }

    #[must_use]
    pub fn range(self) -> ParameterRange {
        match self {
            Self::Radius => ParameterRange {
                min: 20.0,
                max: 70.0,
                step: 1.0,
                default: 40.0,
            },
            Self::LayerThickness => ParameterRange {
                min: 1.0,
                max: 8.0,
                step: 0.5,
                default: 3.0,
            },
            Self::VerticalSpacing | Self::CrossSpacing => ParameterRange {
                min: 2.0,
                max: 15.0,
                step: 0.5,
                default: 5.0,
            },
            Self::HorizontalCuts => ParameterRange {
                min: 0.0,
                max: 10.0,
                step: 1.0,
                default: 0.0,
            },
        }
    }

    #[must_use]
    pub fn default_value(self) -> f64 {
        self.range().default
    }

    /// Klemt `value` binnen het bereik en rondt af op de stapgrootte.
    #[must_use]
    pub fn snap(self, value: f64) -> f64 {
        let range = self.range();
        let clamped = clamp(value, range.min, range.max);
        let stepped = range.min + ((clamped - range.min) / range.step).round() * range.step;
        clamp(stepped, range.min, range.max)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ParameterKind {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|kind| kind.id() == normalized || kind.aliases().contains(&normalized.as_str()))
            .ok_or_else(|| ParamError::UnknownParameter(s.trim().to_owned()))
    }
}

/// Vaste uigroottes uit de presentatielaag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    Small,
    Medium,
    Large,
}

impl SizePreset {
    pub const ALL: [SizePreset; 3] = [SizePreset::Small, SizePreset::Medium, SizePreset::Large];

    #[must_use]
    pub fn radius(self) -> f64 {
        match self {
            Self::Small => 30.0,
            Self::Medium => 45.0,
            Self::Large => 60.0,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl FromStr for SizePreset {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_name(s);
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == normalized)
            .ok_or_else(|| ParamError::UnknownPreset(s.trim().to_owned()))
    }
}

/// Instellingen van de explosieweergave. Raakt nooit de statistiek.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionControls {
    /// Scheiding tussen stukken, in [0, 0.5].
    pub spread: f64,
    /// Optillen per rok, in [0, 0.3].
    pub lift: f64,
}

impl ExplosionControls {
    pub const MAX_SPREAD: f64 = 0.5;
    pub const MAX_LIFT: f64 = 0.3;

    /// Bouwt geklemde explosie-instellingen; niet-eindige waarden worden 0.
    #[must_use]
    pub fn new(spread: f64, lift: f64) -> Self {
        Self {
            spread: clamp_finite(spread, Self::MAX_SPREAD),
            lift: clamp_finite(lift, Self::MAX_LIFT),
        }
    }
}

impl Default for ExplosionControls {
    fn default() -> Self {
        Self {
            spread: 0.0,
            lift: 0.05,
        }
    }
}

fn clamp_finite(value: f64, max: f64) -> f64 {
    if value.is_finite() {
        clamp(value, 0.0, max)
    } else {
        0.0
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(['-', ' '], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_view() {
        let params = SimulationParameters::default();
        assert_eq!(params.radius, 40.0);
        assert_eq!(params.layer_thickness, 3.0);
        assert_eq!(params.vertical_spacing, 5.0);
        assert_eq!(params.cross_spacing, 5.0);
        assert_eq!(params.horizontal_cuts, 0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_and_non_finite_values() {
        let err = SimulationParameters::new(40.0, 0.0, 5.0, 5.0, 0).unwrap_err();
        assert!(matches!(err, ParamError::NotPositive { name: "layer_thickness", .. }));

        let err = SimulationParameters::new(f64::NAN, 3.0, 5.0, 5.0, 0).unwrap_err();
        assert_eq!(err, ParamError::NonFinite { name: "radius" });

        let err = SimulationParameters::new(40.0, 3.0, 5.0, -1.0, 0).unwrap_err();
        assert!(format!("{err}").contains("cross_spacing"));
    }

    #[test]
    fn h_spacing_divides_radius_into_equal_bands() {
        let params = SimulationParameters::default();
        assert_eq!(params.h_spacing(), None);
        assert_eq!(params.with_horizontal_cuts(3).h_spacing(), Some(10.0));
    }

    #[test]
    fn h_spacing_handles_maximum_cut_count() {
        let params = SimulationParameters::new(40.0, 3.0, 5.0, 5.0, u32::MAX).expect("valid");
        let spacing = params.h_spacing().expect("spacing");
        assert!(spacing.is_finite() && spacing > 0.0);
        assert!((spacing - 40.0 / 4_294_967_296.0).abs() < 1e-18);
    }

    #[test]
    fn snap_clamps_and_quantizes_to_step() {
        assert_eq!(ParameterKind::Radius.snap(100.0), 70.0);
        assert_eq!(ParameterKind::Radius.snap(33.4), 33.0);
        assert_eq!(ParameterKind::LayerThickness.snap(2.3), 2.5);
        assert_eq!(ParameterKind::HorizontalCuts.snap(-4.0), 0.0);
        assert_eq!(ParameterKind::VerticalSpacing.snap(1.0), 2.0);
    }

    #[test]
    fn parameter_lookup_accepts_ids_and_aliases() {
        assert_eq!("radius".parse::<ParameterKind>(), Ok(ParameterKind::Radius));
        assert_eq!(" Layer ".parse::<ParameterKind>(), Ok(ParameterKind::LayerThickness));
        assert_eq!("horizontal-cuts".parse::<ParameterKind>(), Ok(ParameterKind::HorizontalCuts));
        assert!(matches!(
            "onbekend".parse::<ParameterKind>(),
            Err(ParamError::UnknownParameter(_))
        ));
    }

    #[test]
    fn setting_horizontal_cuts_rounds_to_integer() {
        let mut params = SimulationParameters::default();
        params.set(ParameterKind::HorizontalCuts, 2.6);
        assert_eq!(params.horizontal_cuts, 3);
        assert_eq!(params.get(ParameterKind::HorizontalCuts), 3.0);
    }

    #[test]
    fn presets_map_to_radii() {
        assert_eq!("Medium".parse::<SizePreset>().map(SizePreset::radius), Ok(45.0));
        assert!("huge".parse::<SizePreset>().is_err());
    }

    #[test]
    fn explosion_controls_are_clamped() {
        let controls = ExplosionControls::new(0.9, -1.0);
        assert_eq!(controls.spread, 0.5);
        assert_eq!(controls.lift, 0.0);
        assert_eq!(ExplosionControls::new(f64::NAN, 0.1).spread, 0.0);
    }
}
