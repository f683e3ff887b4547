//! Report rendering
//!
//! Pure presentation: shapes pipeline output into the structures the
//! page displays. No decision logic lives here, and zero-row reports
//! render as empty structures rather than errors.

use serde::{Deserialize, Serialize};

use crate::logic::ingest::FeatureTable;
use crate::logic::pipeline::UnlabeledReport;

/// Rows shown in the dataset preview widget
pub const PREVIEW_ROWS: usize = 5;

/// One slice of the attack-distribution donut chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub count: usize,
    /// Share of total rows, 0-100, rounded to two decimals
    pub percent: f64,
}

/// Head of the parsed upload, echoed back for the preview widget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablePreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

/// Build chart slices from the frequency table. Percentages sum to
/// ~100 modulo rounding; an empty report produces no slices.
pub fn chart_slices(report: &UnlabeledReport) -> Vec<ChartSlice> {
    let total: usize = report.frequency.iter().map(|c| c.count).sum();
    if total == 0 {
        return Vec::new();
    }

    report
        .frequency
        .iter()
        .map(|class| ChartSlice {
            name: class.name.clone(),
            count: class.count,
            percent: (class.count as f64 / total as f64 * 100.0 * 100.0).round() / 100.0,
        })
        .collect()
}

/// First [`PREVIEW_ROWS`] rows of the upload
pub fn preview(table: &FeatureTable) -> TablePreview {
    TablePreview {
        columns: table.columns.clone(),
        rows: table.rows.iter().take(PREVIEW_ROWS).cloned().collect(),
        total_rows: table.len(),
    }
}

/// Accuracy for display: two decimals, or "undefined" for empty uploads
pub fn format_accuracy(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(pct) => format!("{:.2}", pct),
        None => "undefined".to_string(),
    }
}
