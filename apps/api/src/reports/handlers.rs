use axum::{extract::State, Json};
use chrono::Utc;

use crate::notifications::Notification;
use crate::reports::{dashboard_metrics, pipeline_report, DashboardMetrics, PipelineReport};
use crate::state::AppState;

/// GET /api/v1/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardMetrics> {
    let snapshot = state.stores.snapshot().await;
    Json(dashboard_metrics(
        &snapshot.jobs,
        &snapshot.candidates,
        &snapshot.resumes,
        Utc::now(),
    ))
}

/// GET /api/v1/reports
pub async fn handle_reports(State(state): State<AppState>) -> Json<PipelineReport> {
    let snapshot = state.stores.snapshot().await;
    Json(pipeline_report(
        &snapshot.jobs,
        &snapshot.candidates,
        &snapshot.resumes,
    ))
}

/// GET /api/v1/notifications
pub async fn handle_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifier.recent())
}
