//! Export API handlers
//!
//! POST /exports, GET /exports, GET /exports/:job_id,
//! GET /exports/:job_id/download, DELETE /exports/:job_id, DELETE /exports,
//! POST /exports/cancel

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::jobs::JobFilter,
    error::{ApiError, ApiResult},
    models::{ExportFormat, ExportJobRow, ExportRequest, JobPage, JobStatus},
    AppState,
};

/// POST /exports response
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitExportResponse {
    pub job_id: i64,
}

/// GET /exports/:job_id response
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportStatusResponse {
    pub job_id: i64,
    pub filename: String,
    pub format: ExportFormat,
    pub status: JobStatus,
    pub file_exists: bool,
}

/// GET /exports query
#[derive(Debug, Default, Deserialize)]
pub struct ListExportsQuery {
    pub section_id: Option<i64>,
    pub item_id: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CancelResponse {
    pub cancelled: u64,
}

/// POST /exports
///
/// Returns 202 Accepted with the job id; the export runs in the background.
pub async fn submit_export(
    State(state): State<AppState>,
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitExportResponse>)> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let job_id = state.runner.submit(request).await?;

    Ok((StatusCode::ACCEPTED, Json(SubmitExportResponse { job_id })))
}

/// GET /exports/:job_id
pub async fn get_export(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<ExportStatusResponse>> {
    let job = find_job(&state, job_id).await?;

    Ok(Json(ExportStatusResponse {
        job_id: job.job_id,
        filename: job.filename,
        format: job.format,
        status: job.status,
        file_exists: job.file_exists,
    }))
}

/// GET /exports
pub async fn list_exports(
    State(state): State<AppState>,
    query: Result<Query<ListExportsQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Json<JobPage>> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let filter = JobFilter {
        section_id: query.section_id,
        item_id: query.item_id,
    };
    let page = state
        .runner
        .list_jobs(
            filter,
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(state.page_size),
        )
        .await?;

    Ok(Json(page))
}

/// GET /exports/:job_id/download
///
/// 404 when the job or its file is missing, 409 while the job has not succeeded.
pub async fn download_export(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Response> {
    let job = find_job(&state, job_id).await?;

    if job.status != JobStatus::Succeeded {
        return Err(ApiError::Conflict(format!(
            "Export job {} is {}",
            job_id,
            job.status.as_str()
        )));
    }
    if !job.file_exists {
        return Err(ApiError::NotFound(format!(
            "Export file not found: {}",
            job.filename
        )));
    }

    let bytes = tokio::fs::read(state.runner.artifact_path(&job.filename)).await?;

    let content_type = match job.format {
        ExportFormat::Json => "application/json; charset=utf-8",
        ExportFormat::Csv => "text/csv; charset=utf-8",
    };
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", job.filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// DELETE /exports/:job_id
pub async fn delete_export(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.runner.delete_job(job_id).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// DELETE /exports
pub async fn delete_all_exports(State(state): State<AppState>) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.runner.delete_all_jobs().await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// POST /exports/cancel
pub async fn cancel_exports(State(state): State<AppState>) -> ApiResult<Json<CancelResponse>> {
    let cancelled = state.runner.cancel_all_pending().await?;
    Ok(Json(CancelResponse { cancelled }))
}

async fn find_job(state: &AppState, job_id: i64) -> ApiResult<ExportJobRow> {
    state
        .runner
        .get_job(job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Export job not found: {}", job_id)))
}

pub fn export_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/exports",
            post(submit_export)
                .get(list_exports)
                .delete(delete_all_exports),
        )
        .route("/exports/cancel", post(cancel_exports))
        .route("/exports/:job_id", get(get_export).delete(delete_export))
        .route("/exports/:job_id/download", get(download_export))
}
