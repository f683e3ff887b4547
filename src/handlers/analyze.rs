//! Analyze handlers - the two CSV upload endpoints
//!
//! This is the boundary where every per-request error is caught: the
//! pipeline's `AppError`s convert to JSON error responses here, and a
//! bad upload leaves the service ready for the next one.

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::logic::ingest;
use crate::logic::model::EngineStatus;
use crate::logic::pipeline::{AnnotatedRow, ClassCount, LabelPair, Pipeline};
use crate::logic::report::{self, ChartSlice, TablePreview};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub preview: TablePreview,
    pub rows: Vec<AnnotatedRow>,
    pub frequency: Vec<ClassCount>,
    pub chart: Vec<ChartSlice>,
}

#[derive(Debug, Serialize)]
pub struct ScoredResponse {
    pub preview: TablePreview,
    /// `null` when the upload has no data rows
    pub accuracy: Option<f64>,
    pub accuracy_display: String,
    pub pairing: Vec<LabelPair>,
    pub predictions: Vec<i64>,
}

/// Feature-only upload: predict every row and aggregate attack counts
pub async fn unlabeled(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<AnalyzeResponse>> {
    let table = ingest::parse(&body)?;
    tracing::info!(
        "Analyzing upload: {} rows, {} columns",
        table.len(),
        table.columns.len()
    );

    let pipeline = Pipeline::new(state.classifier.as_ref(), &state.registry);
    let result = pipeline.predict_unlabeled(&table)?;
    let chart = report::chart_slices(&result);

    Ok(Json(AnalyzeResponse {
        preview: report::preview(&table),
        rows: result.rows,
        frequency: result.frequency,
        chart,
    }))
}

/// Labeled upload: predict and score against the "Attack Name" column
pub async fn scored(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ScoredResponse>> {
    let table = ingest::parse(&body)?;
    tracing::info!(
        "Scoring upload: {} rows, {} columns",
        table.len(),
        table.columns.len()
    );

    let pipeline = Pipeline::new(state.classifier.as_ref(), &state.registry);
    let result = pipeline.predict_and_score(&table)?;

    Ok(Json(ScoredResponse {
        preview: report::preview(&table),
        accuracy: result.accuracy,
        accuracy_display: report::format_accuracy(result.accuracy),
        pairing: result.pairing,
        predictions: result.predictions,
    }))
}

/// Engine status for the UI
pub async fn engine_status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.classifier.status())
}
