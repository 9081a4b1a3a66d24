//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::feedback::{normalize, review_views, NormalizedFeedback, ReviewViews};
use crate::platform::Session;
use crate::resumes::record::{list_records, load_record, record_key_pattern, ResumeRecord};
use crate::resumes::upload::{content_type_for, create_resume, read_upload_form};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// One tile on the home page.
#[derive(Debug, Serialize)]
pub struct ResumeCard {
    pub id: Uuid,
    pub company_name: String,
    pub job_title: String,
    /// Absent while the analysis is pending.
    pub overall_score: Option<i64>,
    pub preview_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeMeta {
    pub id: Uuid,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub created_at: DateTime<Utc>,
    pub file_url: String,
    pub preview_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResumeReviewResponse {
    pub resume: ResumeMeta,
    pub feedback: Option<NormalizedFeedback>,
    pub views: ReviewViews,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub feedback: Option<NormalizedFeedback>,
    pub views: ReviewViews,
}

#[derive(Debug, Serialize)]
pub struct WipeResponse {
    pub deleted: usize,
}

fn file_url(id: Uuid) -> String {
    format!("/api/v1/resumes/{id}/file")
}

fn preview_url(record: &ResumeRecord) -> Option<String> {
    record
        .image_path
        .as_ref()
        .map(|_| format!("/api/v1/resumes/{}/preview", record.id))
}

fn review_response(record: ResumeRecord) -> ResumeReviewResponse {
    let feedback = normalize(record.feedback.as_ref());
    let views = review_views(feedback.as_ref());
    ResumeReviewResponse {
        resume: ResumeMeta {
            id: record.id,
            preview_url: preview_url(&record),
            file_url: file_url(record.id),
            company_name: record.company_name,
            job_title: record.job_title,
            job_description: record.job_description,
            created_at: record.created_at,
        },
        feedback,
        views,
    }
}

async fn owned_record(state: &AppState, owner: &str, id: Uuid) -> Result<ResumeRecord, AppError> {
    load_record(state.kv.as_ref(), owner, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

async fn blob_response(state: &AppState, path: &str) -> Result<Response, AppError> {
    let data = state
        .blobs
        .read(path)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {path} not found")))?;
    Ok(([(header::CONTENT_TYPE, content_type_for(path))], data).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes
///
/// Multipart upload: stores the PDF (and optional preview image), analyzes it,
/// and returns the review. The review is pending if analysis failed.
pub async fn handle_upload(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeReviewResponse>), AppError> {
    let form = read_upload_form(multipart, state.config.max_upload_mb).await?;
    let record = create_resume(&state, &session.username, form).await?;
    Ok((StatusCode::CREATED, Json(review_response(record))))
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<ResumeCard>>, AppError> {
    let records = list_records(state.kv.as_ref(), &session.username).await?;
    let cards = records
        .into_iter()
        .map(|record| ResumeCard {
            id: record.id,
            overall_score: normalize(record.feedback.as_ref()).map(|fb| fb.overall_score),
            preview_url: preview_url(&record),
            company_name: record.company_name,
            job_title: record.job_title,
        })
        .collect();
    Ok(Json(cards))
}

/// GET /api/v1/resumes/:id
///
/// The stored feedback is normalized on every read, so records written by
/// older clients (raw or already canonical) render the same way.
pub async fn handle_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeReviewResponse>, AppError> {
    let record = owned_record(&state, &session.username, id).await?;
    Ok(Json(review_response(record)))
}

/// GET /api/v1/resumes/:id/file
pub async fn handle_get_file(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let record = owned_record(&state, &session.username, id).await?;
    blob_response(&state, &record.resume_path).await
}

/// GET /api/v1/resumes/:id/preview
pub async fn handle_get_preview(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let record = owned_record(&state, &session.username, id).await?;
    let path = record
        .image_path
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} has no preview")))?;
    blob_response(&state, &path).await
}

/// DELETE /api/v1/resumes
///
/// Removes every resume record and stored file belonging to the caller.
pub async fn handle_wipe(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<WipeResponse>, AppError> {
    let owner = &session.username;
    let keys = state.kv.list(&record_key_pattern(owner)).await?;

    // Unreadable records are deleted too; only their blobs are unknown.
    for key in &keys {
        if let Some(stored) = state.kv.get(key).await? {
            match serde_json::from_str::<ResumeRecord>(&stored) {
                Ok(record) => {
                    state.blobs.delete(&record.resume_path).await?;
                    if let Some(image_path) = &record.image_path {
                        state.blobs.delete(image_path).await?;
                    }
                }
                Err(e) => tracing::warn!("wiping unreadable record {key}: {e}"),
            }
        }
        state.kv.delete(key).await?;
    }

    tracing::info!("Wiped {} resumes for {owner}", keys.len());
    Ok(Json(WipeResponse {
        deleted: keys.len(),
    }))
}

/// POST /api/v1/feedback/normalize
///
/// Normalizes an arbitrary feedback payload. `null` yields the pending views.
pub async fn handle_normalize(Json(raw): Json<Value>) -> Json<NormalizeResponse> {
    let feedback = normalize(Some(&raw));
    let views = review_views(feedback.as_ref());
    Json(NormalizeResponse { feedback, views })
}
