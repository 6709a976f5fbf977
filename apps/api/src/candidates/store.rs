use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::candidates::derivation::sync_candidates;
use crate::models::candidate::{Candidate, CandidateStage};
use crate::models::job::Job;
use crate::models::resume::ResumeRecord;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateFilter {
    /// Matches name, email or any skill, case-insensitively.
    pub query: Option<String>,
    pub job_id: Option<String>,
    pub stage: Option<CandidateStage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub stage: CandidateStage,
    pub count: usize,
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SyncSummary {
    pub derived: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateStore {
    candidates: Vec<Candidate>,
}

impl CandidateStore {
    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn get_by_job_id(&self, job_id: &str) -> Vec<&Candidate> {
        self.candidates.iter().filter(|c| c.job_id == job_id).collect()
    }

    pub fn list(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Moves a candidate to any stage. No ordering is enforced.
    pub fn update_stage(&mut self, id: &str, stage: CandidateStage) -> Option<&Candidate> {
        let candidate = self.candidates.iter_mut().find(|c| c.id == id)?;
        candidate.stage = stage;
        candidate.updated_at = Utc::now();
        Some(candidate)
    }

    /// Recomputes every résumé-derived candidate and merges it over the current set.
    pub fn sync_from_resumes<R: Rng + ?Sized>(
        &mut self,
        resumes: &[ResumeRecord],
        jobs: &[Job],
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> SyncSummary {
        let merged = sync_candidates(resumes, jobs, &self.candidates, rng, now);
        self.candidates = merged.candidates;
        SyncSummary {
            derived: merged.derived_ids,
            total: self.candidates.len(),
        }
    }

    pub fn search(&self, filter: &CandidateFilter) -> Vec<&Candidate> {
        let query = filter
            .query
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();

        self.candidates
            .iter()
            .filter(|c| filter.job_id.as_deref().map_or(true, |j| c.job_id == j))
            .filter(|c| filter.stage.map_or(true, |s| c.stage == s))
            .filter(|c| {
                query.is_empty()
                    || c.name.to_lowercase().contains(&query)
                    || c.email.to_lowercase().contains(&query)
                    || c.skills.iter().any(|s| s.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Kanban columns for the non-terminal stages, in pipeline order.
    pub fn board(&self, job_id: Option<&str>) -> Vec<BoardColumn> {
        CandidateStage::BOARD
            .iter()
            .map(|&stage| {
                let candidates: Vec<Candidate> = self
                    .candidates
                    .iter()
                    .filter(|c| c.stage == stage)
                    .filter(|c| job_id.map_or(true, |j| c.job_id == j))
                    .cloned()
                    .collect();
                BoardColumn {
                    stage,
                    count: candidates.len(),
                    candidates,
                }
            })
            .collect()
    }
}
