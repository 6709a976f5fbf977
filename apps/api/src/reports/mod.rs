//! Dashboard and reports-page aggregates. Pure functions over store snapshots.

pub mod handlers;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::candidate::{Candidate, CandidateStage};
use crate::models::job::{Job, JobStatus};
use crate::models::resume::{ResumeRecord, StatusCounts};

const NEW_CANDIDATE_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StageCount {
    pub stage: CandidateStage,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JobStats {
    pub job_id: String,
    pub title: String,
    /// Counter stored on the job itself.
    pub applications: u32,
    /// Candidates currently linked to the job.
    pub candidates: usize,
    /// Linked candidates not yet hired or rejected.
    pub active: usize,
    pub hired: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardMetrics {
    /// Published jobs only.
    pub total_jobs: usize,
    pub total_candidates: usize,
    pub new_candidates_this_week: usize,
    pub pending_review: usize,
    pub analyzed_resumes: usize,
    pub job_stats: Vec<JobStats>,
    pub candidates_by_stage: Vec<StageCount>,
}

/// One row per job, in store order. Titles may repeat.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobReport {
    pub job_id: String,
    pub title: String,
    pub candidates: usize,
    /// Mean candidate score rounded to one decimal, `None` without candidates.
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PipelineReport {
    pub jobs: Vec<JobReport>,
    pub stage_funnel: Vec<StageCount>,
    pub resume_status: StatusCounts,
}

fn count_by_stage(candidates: &[Candidate], stages: &[CandidateStage]) -> Vec<StageCount> {
    stages
        .iter()
        .map(|&stage| StageCount {
            stage,
            count: candidates.iter().filter(|c| c.stage == stage).count(),
        })
        .collect()
}

pub fn dashboard_metrics(
    jobs: &[Job],
    candidates: &[Candidate],
    resumes: &[ResumeRecord],
    now: DateTime<Utc>,
) -> DashboardMetrics {
    let week_ago = now - Duration::days(NEW_CANDIDATE_WINDOW_DAYS);

    let job_stats = jobs
        .iter()
        .map(|job| {
            let linked = candidates.iter().filter(|c| c.job_id == job.id);
            JobStats {
                job_id: job.id.clone(),
                title: job.title.clone(),
                applications: job.applications,
                candidates: linked.clone().count(),
                active: linked.clone().filter(|c| !c.stage.is_terminal()).count(),
                hired: linked.filter(|c| c.stage == CandidateStage::Hired).count(),
            }
        })
        .collect();

    DashboardMetrics {
        total_jobs: jobs.iter().filter(|j| j.status == JobStatus::Published).count(),
        total_candidates: candidates.len(),
        new_candidates_this_week: candidates
            .iter()
            .filter(|c| c.created_at >= week_ago && c.created_at <= now)
            .count(),
        pending_review: candidates
            .iter()
            .filter(|c| c.stage == CandidateStage::Applied)
            .count(),
        analyzed_resumes: resumes.iter().filter(|r| r.analyzed).count(),
        job_stats,
        candidates_by_stage: count_by_stage(candidates, &CandidateStage::ALL),
    }
}

pub fn pipeline_report(
    jobs: &[Job],
    candidates: &[Candidate],
    resumes: &[ResumeRecord],
) -> PipelineReport {
    let rows = jobs
        .iter()
        .map(|job| {
            let scores: Vec<u32> = candidates
                .iter()
                .filter(|c| c.job_id == job.id)
                .map(|c| u32::from(c.score))
                .collect();
            let average_score = (!scores.is_empty()).then(|| {
                let mean = f64::from(scores.iter().sum::<u32>()) / scores.len() as f64;
                (mean * 10.0).round() / 10.0
            });
            JobReport {
                job_id: job.id.clone(),
                title: job.title.clone(),
                candidates: scores.len(),
                average_score,
            }
        })
        .collect();

    PipelineReport {
        jobs: rows,
        stage_funnel: count_by_stage(candidates, &CandidateStage::BOARD),
        resume_status: StatusCounts::tally(resumes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{mock_candidates, mock_jobs};
    use chrono::TimeZone;

    #[test]
    fn test_dashboard_on_seed_data() {
        let jobs = mock_jobs();
        let mut candidates = mock_candidates();
        candidates[2].stage = CandidateStage::Hired;
        let now = Utc.with_ymd_and_hms(2023, 5, 19, 0, 0, 0).unwrap();

        let m = dashboard_metrics(&jobs, &candidates, &[], now);
        assert_eq!(m.total_jobs, 5);
        assert_eq!(m.total_candidates, 5);
        // Created 2023-05-12 through 2023-05-18.
        assert_eq!(m.new_candidates_this_week, 5);
        assert_eq!(m.pending_review, 0);
        assert_eq!(m.analyzed_resumes, 0);

        let frontend = &m.job_stats[0];
        assert_eq!(frontend.applications, 24);
        assert_eq!(frontend.candidates, 3);
        assert_eq!(frontend.active, 2);
        assert_eq!(frontend.hired, 1);

        assert_eq!(m.candidates_by_stage.len(), 8);
        let interview = m
            .candidates_by_stage
            .iter()
            .find(|s| s.stage == CandidateStage::Interview)
            .unwrap();
        assert_eq!(interview.count, 2);
        let total: usize = m.candidates_by_stage.iter().map(|s| s.count).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_new_candidates_window_excludes_old_ones() {
        let now = Utc.with_ymd_and_hms(2023, 5, 20, 0, 0, 0).unwrap();
        let m = dashboard_metrics(&mock_jobs(), &mock_candidates(), &[], now);
        // Only the 2023-05-12 candidate falls outside the window.
        assert_eq!(m.new_candidates_this_week, 4);
    }

    #[test]
    fn test_unpublished_jobs_are_not_counted() {
        let mut jobs = mock_jobs();
        jobs[0].status = JobStatus::Closed;
        jobs[1].status = JobStatus::Draft;
        let m = dashboard_metrics(&jobs, &[], &[], Utc::now());
        assert_eq!(m.total_jobs, 3);
        assert_eq!(m.job_stats.len(), 5);
    }

    #[test]
    fn test_pipeline_report_aggregates() {
        let report = pipeline_report(&mock_jobs(), &mock_candidates(), &[]);
        let row = |title: &str| report.jobs.iter().find(|j| j.title == title).unwrap();

        assert_eq!(report.jobs.len(), 5);
        assert_eq!(row("Senior Frontend Developer").candidates, 3);
        assert_eq!(row("Project Manager").candidates, 0);
        // (85 + 92 + 78) / 3 = 85.0
        assert_eq!(row("Senior Frontend Developer").average_score, Some(85.0));
        assert_eq!(row("UX/UI Designer").average_score, Some(89.0));
        assert_eq!(row("Project Manager").average_score, None);

        assert_eq!(report.stage_funnel.len(), 6);
        assert_eq!(report.resume_status.total, 0);
    }

    #[test]
    fn test_jobs_sharing_a_title_stay_separate() {
        let mut jobs = mock_jobs();
        jobs[1].title = jobs[0].title.clone();
        let candidates = mock_candidates();

        let report = pipeline_report(&jobs, &candidates, &[]);
        let shared: Vec<&JobReport> =
            report.jobs.iter().filter(|j| j.title == jobs[0].title).collect();
        assert_eq!(shared.len(), 2);
        assert_ne!(shared[0].job_id, shared[1].job_id);

        let counted: usize = report.jobs.iter().map(|j| j.candidates).sum();
        assert_eq!(counted, candidates.len());
    }
}
