pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::candidates::handlers as candidates;
use crate::jobs::handlers as jobs;
use crate::reports::handlers as reports;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Dashboard & reports
        .route("/api/v1/dashboard", get(reports::handle_dashboard))
        .route("/api/v1/reports", get(reports::handle_reports))
        .route("/api/v1/notifications", get(reports::handle_notifications))
        // Jobs
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        .route(
            "/api/v1/jobs/:id/candidates",
            get(jobs::handle_job_candidates),
        )
        // Candidates
        .route("/api/v1/candidates", get(candidates::handle_list_candidates))
        .route("/api/v1/candidates/board", get(candidates::handle_board))
        .route("/api/v1/candidates/sync", post(candidates::handle_sync))
        .route("/api/v1/candidates/:id", get(candidates::handle_get_candidate))
        .route(
            "/api/v1/candidates/:id/stage",
            patch(candidates::handle_update_stage),
        )
        // Résumés
        .route(
            "/api/v1/resumes",
            get(resumes::handle_list_resumes)
                .post(resumes::handle_upload_resumes)
                .delete(resumes::handle_clear_resumes),
        )
        .route("/api/v1/resumes/progress", get(resumes::handle_progress))
        .route("/api/v1/resumes/convert", post(resumes::handle_convert))
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume).delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/status",
            patch(resumes::handle_update_status),
        )
        .route("/api/v1/resumes/:id/retry", post(resumes::handle_retry))
        .with_state(state)
}
