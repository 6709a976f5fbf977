use std::collections::HashMap;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use super::{BusyGuard, SimulationSettings, Simulator};
use crate::errors::AppError;
use crate::models::resume::{ResumeStatus, StatusExtra};
use crate::notifications::NotificationLevel;

pub const ANALYSIS_FAILED: &str = "Analysis failed";
pub const ANALYSIS_TIMED_OUT: &str = "Analysis timed out";
pub const ANALYSIS_INTERRUPTED: &str = "Analysis interrupted by restart";

/// Keyword source for résumés not linked to a job.
pub const DEFAULT_SKILL_POOL: [&str; 8] = [
    "JavaScript",
    "TypeScript",
    "React",
    "Node.js",
    "Python",
    "SQL",
    "Docker",
    "Communication",
];

const KEYWORD_KEEP_PROBABILITY: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Completed { match_score: u8, keywords: Vec<String> },
    Failed { error: String },
}

impl AnalysisOutcome {
    fn into_update(self) -> (ResumeStatus, StatusExtra) {
        match self {
            AnalysisOutcome::Completed {
                match_score,
                keywords,
            } => (
                ResumeStatus::Completed,
                StatusExtra {
                    match_score: Some(match_score),
                    keywords: Some(keywords),
                    ..StatusExtra::default()
                },
            ),
            AnalysisOutcome::Failed { error } => (
                ResumeStatus::Failed,
                StatusExtra {
                    error: Some(error),
                    ..StatusExtra::default()
                },
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisSummary {
    pub batches: usize,
    pub completed: usize,
    pub failed: usize,
    /// Items whose timer was cancelled because the résumé was removed.
    pub cancelled: usize,
}

/// Rolls the result of one analysis: success with probability `success_rate`,
/// a 60..100 score and a random subset of `skill_pool` as keywords.
pub fn roll_outcome<R: Rng + ?Sized>(
    rng: &mut R,
    success_rate: f64,
    skill_pool: &[String],
) -> AnalysisOutcome {
    if !rng.random_bool(success_rate.clamp(0.0, 1.0)) {
        return AnalysisOutcome::Failed {
            error: ANALYSIS_FAILED.to_string(),
        };
    }
    let match_score = rng.random_range(60..100);
    let keywords = skill_pool
        .iter()
        .filter(|_| rng.random_bool(KEYWORD_KEEP_PROBABILITY))
        .cloned()
        .collect();
    AnalysisOutcome::Completed {
        match_score,
        keywords,
    }
}

/// `base + U(0, jitter) + index * stagger`
pub fn item_delay<R: Rng + ?Sized>(
    rng: &mut R,
    settings: &SimulationSettings,
    index: usize,
) -> Duration {
    let jitter_ms = settings.jitter.as_millis() as u64;
    let jitter = if jitter_ms == 0 {
        Duration::ZERO
    } else {
        Duration::from_millis(rng.random_range(0..jitter_ms))
    };
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    settings.base_delay + jitter + settings.stagger.saturating_mul(index)
}

struct PlannedItem {
    id: String,
    delay: Duration,
    outcome: AnalysisOutcome,
}

impl Simulator {
    /// Background worker: one analysis pass per wake-up until shutdown.
    pub fn spawn_worker(&self) -> JoinHandle<()> {
        let sim = self.clone();
        tokio::spawn(async move {
            let recovered = sim.recover_interrupted().await;
            if recovered > 0 {
                warn!(count = recovered, "Marked interrupted analyses as failed");
            }
            // Records uploaded before a restart are still waiting.
            sim.wake();

            loop {
                tokio::select! {
                    _ = sim.inner.shutdown.cancelled() => break,
                    _ = sim.inner.wake.notified() => {
                        if let Err(e) = sim.run_analysis_pass().await {
                            error!(error = %e, "Analysis pass aborted");
                        }
                    }
                }
            }
            info!("Analysis worker stopped");
        })
    }

    /// Records left in `processing` by a previous process can never resolve;
    /// they are failed so the recruiter can retry them.
    pub async fn recover_interrupted(&self) -> usize {
        self.inner
            .stores
            .resumes
            .write_best_effort(|store| {
                let stuck: Vec<String> = store
                    .list()
                    .iter()
                    .filter(|r| r.status == ResumeStatus::Processing)
                    .map(|r| r.id.clone())
                    .collect();
                for id in &stuck {
                    store.update_status(
                        id,
                        ResumeStatus::Failed,
                        StatusExtra {
                            error: Some(ANALYSIS_INTERRUPTED.to_string()),
                            ..StatusExtra::default()
                        },
                    );
                }
                stuck.len()
            })
            .await
    }

    /// Analyzes every uploaded `pending` résumé, in batches of at most
    /// `batch_size`. Each batch resolves fully before the next one starts.
    ///
    /// Returns `None` when another pass is already running.
    pub async fn run_analysis_pass(&self) -> Result<Option<AnalysisSummary>, AppError> {
        let Some(_guard) = BusyGuard::acquire(&self.inner.analyzing) else {
            debug!("Analysis pass already running");
            return Ok(None);
        };

        let mut summary = AnalysisSummary::default();
        while !self.inner.shutdown.is_cancelled() {
            let batch: Vec<String> = {
                let resumes = self.inner.stores.resumes.read().await;
                resumes
                    .pending_uploaded_ids()
                    .into_iter()
                    .take(self.inner.settings.batch_size)
                    .collect()
            };
            if batch.is_empty() {
                break;
            }
            summary.batches += 1;
            info!(batch = summary.batches, size = batch.len(), "Analyzing batch");
            self.run_batch(batch, &mut summary).await?;
        }

        if summary.completed + summary.failed > 0 {
            info!(
                completed = summary.completed,
                failed = summary.failed,
                cancelled = summary.cancelled,
                "Analysis pass finished"
            );
            self.inner.notifier.publish(
                if summary.failed == 0 {
                    NotificationLevel::Success
                } else {
                    NotificationLevel::Error
                },
                "Analysis complete",
                format!(
                    "{} resume(s) analyzed, {} failed",
                    summary.completed, summary.failed
                ),
            );
        }
        Ok(Some(summary))
    }

    async fn run_batch(
        &self,
        batch: Vec<String>,
        summary: &mut AnalysisSummary,
    ) -> Result<(), AppError> {
        let stores = &self.inner.stores;
        let settings = &self.inner.settings;

        let started: Vec<String> = stores
            .resumes
            .write(|store| {
                batch
                    .into_iter()
                    .filter(|id| {
                        store.update_status(id, ResumeStatus::Processing, StatusExtra::default())
                    })
                    .collect()
            })
            .await?;

        let pools = self.skill_pools(&started).await;
        let plan: Vec<PlannedItem> = {
            let mut rng = self
                .inner
                .rng
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            started
                .into_iter()
                .enumerate()
                .map(|(index, id)| {
                    let delay = item_delay(&mut *rng, settings, index);
                    let pool = pools.get(&id).map(Vec::as_slice).unwrap_or_default();
                    let outcome = roll_outcome(&mut *rng, settings.success_rate, pool);
                    PlannedItem { id, delay, outcome }
                })
                .collect()
        };

        let mut tasks = JoinSet::new();
        for PlannedItem { id, delay, outcome } in plan {
            let token = self.inner.shutdown.child_token();
            self.in_flight().insert(id.clone(), token.clone());
            let timeout = settings.item_timeout;
            tasks.spawn(async move {
                let resolved = tokio::select! {
                    _ = token.cancelled() => None,
                    timed = tokio::time::timeout(timeout, tokio::time::sleep(delay)) => {
                        Some(match timed {
                            Ok(()) => outcome,
                            Err(_) => AnalysisOutcome::Failed {
                                error: ANALYSIS_TIMED_OUT.to_string(),
                            },
                        })
                    }
                };
                (id, resolved)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (id, resolved) = joined
                .map_err(|e| AppError::Internal(anyhow::anyhow!("analysis task failed: {e}")))?;
            self.in_flight().remove(&id);

            let Some(outcome) = resolved else {
                debug!(resume_id = %id, "Analysis cancelled");
                summary.cancelled += 1;
                continue;
            };
            let failed = matches!(outcome, AnalysisOutcome::Failed { .. });
            let (status, extra) = outcome.into_update();
            // A processing record must always resolve, saved or not.
            let applied = stores
                .resumes
                .write_best_effort(|store| store.update_status(&id, status, extra))
                .await;
            match applied {
                true if failed => summary.failed += 1,
                true => summary.completed += 1,
                false => debug!(resume_id = %id, "Resume removed before analysis resolved"),
            }
        }
        Ok(())
    }

    /// Keyword pool per résumé: the linked job's skills, or the default pool
    /// when there is no job or it lists no skills.
    ///
    /// Only one store lock is held at a time.
    async fn skill_pools(&self, ids: &[String]) -> HashMap<String, Vec<String>> {
        let links: Vec<(String, Option<String>)> = {
            let resumes = self.inner.stores.resumes.read().await;
            ids.iter()
                .map(|id| {
                    let job_id = resumes.get_by_id(id).and_then(|r| r.job_id.clone());
                    (id.clone(), job_id)
                })
                .collect()
        };

        let jobs = self.inner.stores.jobs.read().await;
        links
            .into_iter()
            .map(|(id, job_id)| {
                let pool = job_id
                    .as_deref()
                    .and_then(|job_id| jobs.get_by_id(job_id))
                    .filter(|job| !job.skills.is_empty())
                    .map(|job| job.skills.clone())
                    .unwrap_or_else(|| DEFAULT_SKILL_POOL.iter().map(|s| s.to_string()).collect());
                (id, pool)
            })
            .collect()
    }
}
