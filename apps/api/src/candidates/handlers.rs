use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::candidates::store::{BoardColumn, CandidateFilter, SyncSummary};
use crate::candidates::sync_from_stores;
use crate::errors::AppError;
use crate::models::candidate::{Candidate, CandidateStage};
use crate::state::AppState;

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
    Query(filter): Query<CandidateFilter>,
) -> Json<Vec<Candidate>> {
    let candidates = state.stores.candidates.read().await;
    Json(candidates.search(&filter).into_iter().cloned().collect())
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Candidate>, AppError> {
    let candidates = state.stores.candidates.read().await;
    candidates
        .get_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    pub job_id: Option<String>,
}

/// GET /api/v1/candidates/board
pub async fn handle_board(
    State(state): State<AppState>,
    Query(params): Query<BoardQuery>,
) -> Json<Vec<BoardColumn>> {
    let candidates = state.stores.candidates.read().await;
    Json(candidates.board(params.job_id.as_deref()))
}

#[derive(Debug, Deserialize)]
pub struct StageUpdate {
    pub stage: CandidateStage,
}

/// PATCH /api/v1/candidates/:id/stage
pub async fn handle_update_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<StageUpdate>,
) -> Result<Json<Candidate>, AppError> {
    let updated = state
        .stores
        .candidates
        .write(|store| store.update_stage(&id, req.stage).cloned())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;

    info!(candidate_id = %id, stage = req.stage.as_str(), "Candidate stage updated");
    Ok(Json(updated))
}

/// POST /api/v1/candidates/sync
pub async fn handle_sync(State(state): State<AppState>) -> Result<Json<SyncSummary>, AppError> {
    Ok(Json(sync_from_stores(&state.stores, &state.rng).await?))
}
