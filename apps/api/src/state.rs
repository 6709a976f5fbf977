use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::candidates::CandidateStore;
use crate::config::Config;
use crate::errors::AppError;
use crate::jobs::JobStore;
use crate::models::candidate::Candidate;
use crate::models::job::Job;
use crate::models::resume::ResumeRecord;
use crate::notifications::Notifier;
use crate::resumes::ResumeStore;
use crate::seed::{mock_candidates, mock_jobs};
use crate::simulator::Simulator;
use crate::storage::{Partition, Persisted, SnapshotStore};

/// Shared source of demo randomness. Seeded from `RNG_SEED` when set.
pub type SharedRng = Arc<Mutex<StdRng>>;

pub fn shared_rng(seed: Option<u64>) -> SharedRng {
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    Arc::new(Mutex::new(rng))
}

/// Point-in-time copies of every store, for aggregates spanning all three.
#[derive(Debug, Clone)]
pub struct StoresSnapshot {
    pub jobs: Vec<Job>,
    pub candidates: Vec<Candidate>,
    pub resumes: Vec<ResumeRecord>,
}

/// The three persisted stores, one snapshot partition each.
///
/// Code never holds two store locks at once; cross-store readers copy one
/// store at a time instead.
pub struct Stores {
    pub jobs: Persisted<JobStore>,
    pub resumes: Persisted<ResumeStore>,
    pub candidates: Persisted<CandidateStore>,
}

impl Stores {
    /// Rehydrates every partition. Empty job and candidate partitions get demo
    /// data when `seed_mock_data` is set; résumés always start empty.
    pub async fn load(
        backend: Arc<dyn SnapshotStore>,
        seed_mock_data: bool,
    ) -> Result<Self, AppError> {
        let jobs = Persisted::load_or(Partition::Jobs, backend.clone(), || {
            if seed_mock_data {
                JobStore::from_jobs(mock_jobs())
            } else {
                JobStore::default()
            }
        })
        .await?;
        let resumes =
            Persisted::load_or(Partition::Resumes, backend.clone(), ResumeStore::default).await?;
        let candidates = Persisted::load_or(Partition::Candidates, backend, || {
            if seed_mock_data {
                CandidateStore::from_candidates(mock_candidates())
            } else {
                CandidateStore::default()
            }
        })
        .await?;

        Ok(Self {
            jobs,
            resumes,
            candidates,
        })
    }

    /// Copies each store under its own read lock, releasing it before the next.
    pub async fn snapshot(&self) -> StoresSnapshot {
        let jobs = self.jobs.read().await.list().to_vec();
        let candidates = self.candidates.read().await.list().to_vec();
        let resumes = self.resumes.read().await.list().to_vec();
        StoresSnapshot {
            jobs,
            candidates,
            resumes,
        }
    }
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub stores: Arc<Stores>,
    pub notifier: Notifier,
    pub rng: SharedRng,
    /// Upload/analysis simulation. Owns the background worker's wake-up and cancellation.
    pub simulator: Simulator,
}
