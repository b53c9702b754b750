//! CSV-document zoals de spreadsheet-export het verwacht: UTF-8 met BOM,
//! puntkomma als scheidingsteken en `\n` als regeleinde.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::result::SimulationResult;

use super::{ExportError, ExportMode, Rating};

pub const CSV_BOM: &str = "\u{FEFF}";
pub const DELIMITER: &str = ";";
pub const COLUMN_COUNT: usize = 13;

pub const ENGLISH_HEADERS: [&str; COLUMN_COUNT] = [
    "Radius (mm)",
    "Layer Thickness (mm)",
    "Vertical Spacing (mm)",
    "Cross Spacing (mm)",
    "Horizontal Cuts Count",
    "Piece Count",
    "Total Volume (mm3)",
    "Average (mm3)",
    "Median (mm3)",
    "Max (mm3)",
    "StdDev (mm3)",
    "CV (%)",
    "Rating",
];

/// Gelokaliseerde kolomkoppen en beoordelingslabels, aangeleverd door de
/// presentatielaag. Ontbrekende velden vallen terug op Engels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportLabels {
    pub headers: Vec<String>,
    pub rating_very_homogeneous: String,
    pub rating_good: String,
    pub rating_uneven: String,
}

impl Default for ExportLabels {
    fn default() -> Self {
        Self {
            headers: ENGLISH_HEADERS.iter().map(|&header| header.to_owned()).collect(),
            rating_very_homogeneous: "Very Homogeneous".to_owned(),
            rating_good: "Good".to_owned(),
            rating_uneven: "Uneven".to_owned(),
        }
    }
}

impl ExportLabels {
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.headers.len() == COLUMN_COUNT {
            Ok(())
        } else {
            Err(ExportError::HeaderCount {
                expected: COLUMN_COUNT,
                actual: self.headers.len(),
            })
        }
    }
}

/// Eén datarij zonder regeleinde. Invoerwaarden en het stukaantal staan er
/// onbewerkt in, afgeleide grootheden met twee decimalen.
#[must_use]
pub fn format_row(result: &SimulationResult, labels: &ExportLabels) -> String {
    let p = &result.parameters;
    let rating = Rating::classify(result.cv).label(labels);
    let fields = [
        p.radius.to_string(),
        p.layer_thickness.to_string(),
        p.vertical_spacing.to_string(),
        p.cross_spacing.to_string(),
        p.horizontal_cuts.to_string(),
        result.piece_count.to_string(),
        format!("{:.2}", result.total_volume),
        format!("{:.2}", result.mean_volume),
        format!("{:.2}", result.median_volume),
        format!("{:.2}", result.max_volume),
        format!("{:.2}", result.std_dev),
        format!("{:.2}", result.cv),
        rating.to_owned(),
    ];
    fields.join(DELIMITER)
}

/// BOM, kopregel en één regel per resultaat, elk afgesloten met `\n`.
pub fn render_document(
    labels: &ExportLabels,
    rows: &[SimulationResult],
) -> Result<String, ExportError> {
    labels.validate()?;

    let mut document = String::from(CSV_BOM);
    document.push_str(&labels.headers.join(DELIMITER));
    document.push('\n');
    for row in rows {
        document.push_str(&format_row(row, labels));
        document.push('\n');
    }
    Ok(document)
}

/// `OnionLab_{lang}_{FULL|Data}_{YYYY-MM-DD}.csv`
#[must_use]
pub fn export_file_name(lang: &str, mode: ExportMode, date: Date) -> String {
    let kind = if mode == ExportMode::BatchFull { "FULL" } else { "Data" };
    format!(
        "OnionLab_{lang}_{kind}_{:04}-{:02}-{:02}.csv",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::params::SimulationParameters;
    use crate::stats::summarize;

    fn result_with(cv: f64) -> SimulationResult {
        let mut result = SimulationResult::from_parts(
            SimulationParameters::default().with_horizontal_cuts(2),
            Vec::new(),
            summarize(&[10.0, 20.0, 30.0]),
        );
        result.cv = cv;
        result
    }

    #[test]
    fn header_row_is_english_by_default() {
        let document = render_document(&ExportLabels::default(), &[]).expect("render");
        assert!(document.starts_with(CSV_BOM));
        assert_eq!(
            document.trim_start_matches(CSV_BOM),
            format!("{}\n", ENGLISH_HEADERS.join(";"))
        );
    }

    #[test]
    fn row_prints_inputs_raw_and_metrics_with_two_decimals() {
        let row = format_row(&result_with(40.824_829), &ExportLabels::default());
        assert_eq!(row, "40;3;5;5;2;3;60.00;20.00;20.00;30.00;8.16;40.82;Good");
    }

    #[test]
    fn rating_column_uses_supplied_labels() {
        let labels = ExportLabels {
            rating_very_homogeneous: "Sehr Homogen".to_owned(),
            rating_good: "Gut".to_owned(),
            rating_uneven: "Ungleichmaessig".to_owned(),
            ..ExportLabels::default()
        };
        let rating = |cv: f64| {
            format_row(&result_with(cv), &labels)
                .rsplit(DELIMITER)
                .next()
                .map(str::to_owned)
        };
        assert_eq!(rating(39.9).as_deref(), Some("Sehr Homogen"));
        assert_eq!(rating(60.0).as_deref(), Some("Gut"));
        assert_eq!(rating(80.1).as_deref(), Some("Ungleichmaessig"));
    }

    #[test]
    fn every_row_has_thirteen_fields() {
        let rows = vec![result_with(10.0), result_with(90.0)];
        let document = render_document(&ExportLabels::default(), &rows).expect("render");
        let lines: Vec<&str> = document.split_terminator('\n').collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert_eq!(line.split(DELIMITER).count(), COLUMN_COUNT);
        }
    }

    #[test]
    fn wrong_header_count_is_rejected() {
        let labels = ExportLabels {
            headers: vec!["Radius".to_owned(); 12],
            ..ExportLabels::default()
        };
        assert_eq!(
            render_document(&labels, &[]),
            Err(ExportError::HeaderCount {
                expected: 13,
                actual: 12
            })
        );
    }

    #[test]
    fn file_name_marks_full_sweeps() {
        let day = date!(2024 - 05 - 01);
        assert_eq!(
            export_file_name("en", ExportMode::Single, day),
            "OnionLab_en_Data_2024-05-01.csv"
        );
        assert_eq!(
            export_file_name("de", ExportMode::BatchCurrent, day),
            "OnionLab_de_Data_2024-05-01.csv"
        );
        assert_eq!(
            export_file_name("de", ExportMode::BatchFull, day),
            "OnionLab_de_FULL_2024-05-01.csv"
        );
    }
}
