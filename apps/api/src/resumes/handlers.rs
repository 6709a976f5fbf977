use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::candidates::store::SyncSummary;
use crate::candidates::sync_from_stores;
use crate::errors::AppError;
use crate::models::resume::{ResumeRecord, ResumeStatus, StatusCounts, StatusExtra, UploadedFile};
use crate::notifications::NotificationLevel;
use crate::resumes::intake::{intake_files, IntakeOutcome};
use crate::simulator::UploadProgress;
use crate::state::AppState;

const DEFAULT_MIME: &str = "application/octet-stream";

/// GET /api/v1/resumes
pub async fn handle_list_resumes(State(state): State<AppState>) -> Json<Vec<ResumeRecord>> {
    Json(state.stores.resumes.read().await.list().to_vec())
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeRecord>, AppError> {
    let resumes = state.stores.resumes.read().await;
    resumes
        .get_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// POST /api/v1/resumes
///
/// Every file part of the form is a selected file. Contents are read and
/// discarded; only name, size and type are kept.
pub async fn handle_upload_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<IntakeOutcome>), AppError> {
    if state.simulator.is_uploading() {
        return Err(AppError::Conflict("an upload is already in progress".to_string()));
    }

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field.content_type().unwrap_or(DEFAULT_MIME).to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
        files.push(UploadedFile {
            name,
            size: data.len() as u64,
            mime_type,
        });
    }

    if files.is_empty() {
        return Err(AppError::Validation("No files selected".to_string()));
    }

    let outcome = intake_files(&state.stores.resumes, &state.notifier, files).await?;
    if outcome.created.is_empty() {
        return Err(AppError::UnsupportedFile(format!(
            "No supported files in selection: {}",
            outcome.rejected.join(", ")
        )));
    }

    let ids: Vec<String> = outcome.created.iter().map(|r| r.id.clone()).collect();
    if let Err(e) = state.simulator.start_upload(ids.clone()) {
        // Lost the race with another upload; nothing would ever upload these.
        warn!(count = ids.len(), "Upload already running, discarding new records");
        state
            .stores
            .resumes
            .write(|store| {
                for id in &ids {
                    store.remove(id);
                }
            })
            .await?;
        return Err(e);
    }

    info!(
        accepted = outcome.created.len(),
        rejected = outcome.rejected.len(),
        "Resumes accepted for upload"
    );
    Ok((StatusCode::ACCEPTED, Json(outcome)))
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
    pub cancelled: usize,
}

/// DELETE /api/v1/resumes
pub async fn handle_clear_resumes(
    State(state): State<AppState>,
) -> Result<Json<ClearResponse>, AppError> {
    let removed = state.stores.resumes.write(|store| store.clear()).await?;
    let cancelled = state.simulator.cancel_all();
    info!(removed = removed.len(), cancelled, "Cleared resumes");
    Ok(Json(ClearResponse {
        removed: removed.len(),
        cancelled,
    }))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let removed = state.stores.resumes.write(|store| store.remove(&id)).await?;
    if !removed {
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    }
    if state.simulator.cancel(&id) {
        info!(resume_id = %id, "Cancelled in-flight analysis");
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub upload: UploadProgress,
    pub analyzing: bool,
    pub counts: StatusCounts,
}

/// GET /api/v1/resumes/progress
pub async fn handle_progress(State(state): State<AppState>) -> Json<ProgressResponse> {
    let counts = state.stores.resumes.read().await.status_counts();
    Json(ProgressResponse {
        upload: state.simulator.upload_progress(),
        analyzing: state.simulator.is_analyzing(),
        counts,
    })
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ResumeStatus,
    /// Optional; must agree with `status` when given.
    pub analyzed: Option<bool>,
    #[serde(flatten)]
    pub extra: StatusExtra,
}

/// PATCH /api/v1/resumes/:id/status
///
/// Manual override. Any status but `processing` may be set; that one belongs
/// to the analysis worker, which is the only thing that resolves it. A pending
/// analysis timer for the record is cancelled so it cannot overwrite the new value.
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    if req.status == ResumeStatus::Processing {
        return Err(AppError::Validation(
            "processing is set by the analysis worker and cannot be set manually".to_string(),
        ));
    }
    let completed = req.status == ResumeStatus::Completed;
    if req.analyzed.is_some_and(|analyzed| analyzed != completed) {
        return Err(AppError::Validation(format!(
            "analyzed must be {completed} when status is {}",
            req.status.as_str()
        )));
    }
    if req.extra.match_score.is_some_and(|score| score > 100) {
        return Err(AppError::Validation("match_score must be within 0..=100".to_string()));
    }

    state.simulator.cancel(&id);
    let updated = state
        .stores
        .resumes
        .write(|store| {
            if store.update_status(&id, req.status, req.extra) {
                store.get_by_id(&id).cloned()
            } else {
                None
            }
        })
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    if updated.status == ResumeStatus::Pending && updated.uploaded {
        state.simulator.wake();
    }
    Ok(Json(updated))
}

/// POST /api/v1/resumes/:id/retry
pub async fn handle_retry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeRecord>, AppError> {
    let retried = state
        .stores
        .resumes
        .write(|store| -> Result<Option<ResumeRecord>, AppError> {
            if store.retry(&id)? {
                Ok(store.get_by_id(&id).cloned())
            } else {
                Ok(None)
            }
        })
        .await??
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;

    info!(resume_id = %id, "Resume queued for retry");
    state.simulator.wake();
    Ok(Json(retried))
}

#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    pub resume_ids: Vec<String>,
    pub job_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub marked: usize,
    pub sync: SyncSummary,
}

/// POST /api/v1/resumes/convert
///
/// Links the résumés to a job, then rebuilds derived candidates. Only
/// résumés already analyzed produce a candidate.
pub async fn handle_convert(
    State(state): State<AppState>,
    Json(req): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, AppError> {
    if req.resume_ids.is_empty() {
        return Err(AppError::Validation("resume_ids must not be empty".to_string()));
    }
    if state.stores.jobs.read().await.get_by_id(&req.job_id).is_none() {
        return Err(AppError::NotFound(format!("Job {} not found", req.job_id)));
    }

    let marked = state
        .stores
        .resumes
        .write(|store| store.mark_for_conversion(&req.resume_ids, &req.job_id))
        .await?;
    let sync = sync_from_stores(&state.stores, &state.rng).await?;

    info!(job_id = %req.job_id, marked, derived = sync.derived.len(), "Converted resumes");
    state.notifier.publish(
        NotificationLevel::Info,
        "Conversion requested",
        format!(
            "{marked} resume(s) linked to job {}, {} candidate(s) derived",
            req.job_id,
            sync.derived.len()
        ),
    );
    Ok(Json(ConvertResponse { marked, sync }))
}
