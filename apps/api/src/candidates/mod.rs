pub mod derivation;
pub mod handlers;
pub mod store;

pub use store::CandidateStore;

use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::state::{SharedRng, Stores};
use store::SyncSummary;

/// Rebuilds résumé-derived candidates from the current résumé and job snapshots.
///
/// Résumés and jobs are cloned under their read locks first so the candidate
/// write lock is never held together with another store's lock.
pub async fn sync_from_stores(stores: &Stores, rng: &SharedRng) -> Result<SyncSummary, AppError> {
    let resumes = stores.resumes.read().await.list().to_vec();
    let jobs = stores.jobs.read().await.list().to_vec();

    let summary = stores
        .candidates
        .write(|candidates| {
            let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            candidates.sync_from_resumes(&resumes, &jobs, &mut *rng, Utc::now())
        })
        .await?;

    info!(
        derived = summary.derived.len(),
        total = summary.total,
        "Synchronized candidates from resumes"
    );
    Ok(summary)
}
