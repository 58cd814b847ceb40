//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! library pipeline. Chart and document rendering run on the blocking pool,
//! bounded by the configured render timeout.

use axum::{
    extract::{Form, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::time::Duration;
use tracing::{info, warn};

use super::dto::{
    channel_lengths, BatchStatusResponse, HealthResponse, IngestResponse, PatientForm,
    ReportResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::ingest::IngestPayload;
use crate::report::{self, ReportError, ReportModel, TransportMap};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Run `job` on the blocking pool, giving up after `limit`.
async fn run_blocking<T, F>(limit: Duration, job: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, ReportError> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(job);
    match tokio::time::timeout(limit, task).await {
        Err(_) => {
            warn!("Rendering exceeded {:?}", limit);
            Err(AppError::Timeout(limit.as_secs()))
        }
        Ok(joined) => joined
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
            .map_err(AppError::from),
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        samples: state.store.snapshot().max_len(),
    }))
}

// =============================================================================
// Ingest
// =============================================================================

/// POST /v1/ingest
///
/// Replace the stored batch with the device payload. Channels missing from
/// the payload are cleared.
///
/// A body that is not valid JSON is rejected by the extractor and leaves the
/// stored batch untouched. This includes number literals outside the `f64`
/// range such as `1e400`; the string `"1e400"` is coerced to absent instead.
pub async fn ingest(
    State(state): State<AppState>,
    Json(payload): Json<IngestPayload>,
) -> HandlerResult<IngestResponse> {
    let parsed = payload.into_batch();
    // taken before replace so a concurrent ingest cannot leak into the response
    let channels = channel_lengths(&parsed.batch);
    let sequence = state.store.replace(parsed.batch);

    if !parsed.ignored.is_empty() {
        info!(sequence, ignored = ?parsed.ignored, "Ignored unknown channels");
    }

    Ok(Json(IngestResponse {
        sequence,
        channels,
        ignored: parsed.ignored,
    }))
}

/// GET /v1/batch
pub async fn get_batch(State(state): State<AppState>) -> HandlerResult<BatchStatusResponse> {
    Ok(Json(BatchStatusResponse::from(&state.store.current())))
}

// =============================================================================
// Report
// =============================================================================

/// POST /v1/report
///
/// Build a report from the current batch and the submitted patient data.
/// The response carries the transport map for the export action.
pub async fn build_report(
    State(state): State<AppState>,
    Json(form): Json<PatientForm>,
) -> HandlerResult<ReportResponse> {
    let patient = form.into_patient().map_err(AppError::BadRequest)?;
    let batch = state.store.snapshot();
    let charts = state.charts.clone();
    let config = state.config.clone();

    let report = run_blocking(config.render_timeout(), move || {
        ReportModel::from_batch(
            patient,
            &batch,
            config.report.length_policy,
            charts.as_ref(),
            &config.charts,
        )
    })
    .await?;

    info!(
        records = report.records().len(),
        charts = report.charts().len(),
        "Built report"
    );

    let transport = report::encode(&report);
    Ok(Json(ReportResponse { report, transport }))
}

/// POST /v1/report/export
///
/// Decode the posted transport map and return the rendered document as an
/// attachment. Any decode failure aborts the export.
pub async fn export_report(
    State(state): State<AppState>,
    Form(map): Form<TransportMap>,
) -> Result<Response, AppError> {
    let report = report::decode(&map).inspect_err(|e| warn!("Rejected export payload: {}", e))?;
    let documents = state.documents.clone();

    let document = run_blocking(state.config.render_timeout(), move || {
        documents.render(&report).map_err(ReportError::from)
    })
    .await?;

    info!(file = %document.file_name, bytes = document.bytes.len(), "Exported document");

    let disposition = format!("attachment; filename=\"{}\"", document.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}
