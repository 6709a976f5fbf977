use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::candidate::Candidate;
use crate::models::job::{Job, JobStatus, NewJob};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct JobQuery {
    pub q: Option<String>,
    pub status: Option<JobStatus>,
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobQuery>,
) -> Json<Vec<Job>> {
    let jobs = state.stores.jobs.read().await;
    Json(
        jobs.search(params.q.as_deref(), params.status)
            .into_iter()
            .cloned()
            .collect(),
    )
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<NewJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let job = state.stores.jobs.write(|jobs| jobs.add(req)).await??;
    tracing::info!(job_id = %job.id, title = %job.title, "Job created");
    Ok((StatusCode::CREATED, Json(job)))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    let jobs = state.stores.jobs.read().await;
    jobs.get_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// GET /api/v1/jobs/:id/candidates
pub async fn handle_job_candidates(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    if state.stores.jobs.read().await.get_by_id(&id).is_none() {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    let candidates = state.stores.candidates.read().await;
    Ok(Json(
        candidates.get_by_job_id(&id).into_iter().cloned().collect(),
    ))
}
