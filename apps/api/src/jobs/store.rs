use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::job::{Job, JobRequirement, JobStatus, NewJob};

/// In-memory job collection. Jobs are appended by `add` and never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStore {
    jobs: Vec<Job>,
    /// Millisecond stamp of the last issued id, so ids stay strictly increasing.
    #[serde(default)]
    last_id_millis: i64,
}

impl JobStore {
    pub fn from_jobs(jobs: Vec<Job>) -> Self {
        Self {
            jobs,
            last_id_millis: 0,
        }
    }

    pub fn add(&mut self, new_job: NewJob) -> Result<Job, AppError> {
        self.add_at(new_job, Utc::now())
    }

    pub(crate) fn add_at(&mut self, new_job: NewJob, now: DateTime<Utc>) -> Result<Job, AppError> {
        let new_job = validate_new_job(new_job)?;

        let millis = now.timestamp_millis().max(self.last_id_millis + 1);
        self.last_id_millis = millis;

        let job = Job {
            id: format!("job-{millis}"),
            title: new_job.title,
            department: new_job.department,
            location: new_job.location,
            job_type: new_job.job_type,
            description: new_job.description,
            requirements: new_job
                .requirements
                .into_iter()
                .enumerate()
                .map(|(i, r)| JobRequirement {
                    id: r.id.unwrap_or_else(|| (i + 1).to_string()),
                    description: r.description,
                    is_required: r.is_required,
                })
                .collect(),
            skills: new_job.skills,
            status: new_job.status,
            applications: 0,
            created_at: now,
            updated_at: now,
        };

        self.jobs.push(job.clone());
        Ok(job)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn list(&self) -> &[Job] {
        &self.jobs
    }

    /// Case-insensitive substring match on title, department or description.
    pub fn search(&self, query: Option<&str>, status: Option<JobStatus>) -> Vec<&Job> {
        let query = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
        self.jobs
            .iter()
            .filter(|j| status.map_or(true, |s| j.status == s))
            .filter(|j| {
                query.is_empty()
                    || j.title.to_lowercase().contains(&query)
                    || j.department.to_lowercase().contains(&query)
                    || j.description.to_lowercase().contains(&query)
            })
            .collect()
    }
}

/// Form-level checks for a new job. Blank required fields are rejected;
/// skills and requirements are cleaned rather than rejected.
fn validate_new_job(mut job: NewJob) -> Result<NewJob, AppError> {
    let required = [
        ("title", &job.title),
        ("department", &job.department),
        ("location", &job.location),
        ("description", &job.description),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    job.title = job.title.trim().to_string();
    job.department = job.department.trim().to_string();
    job.location = job.location.trim().to_string();

    let mut skills: Vec<String> = Vec::with_capacity(job.skills.len());
    for skill in job.skills.iter().map(|s| s.trim()) {
        if !skill.is_empty() && !skills.iter().any(|s| s == skill) {
            skills.push(skill.to_string());
        }
    }
    job.skills = skills;

    job.requirements.retain(|r| !r.description.trim().is_empty());

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::NewJobRequirement;
    use chrono::TimeZone;

    fn new_job(title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            department: "Engineering".to_string(),
            location: "Remote".to_string(),
            job_type: "full-time".to_string(),
            description: "Build the hiring pipeline service".to_string(),
            requirements: vec![],
            skills: vec!["Rust".to_string()],
            status: JobStatus::Published,
        }
    }

    #[test]
    fn test_add_assigns_generated_fields() {
        let mut store = JobStore::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let job = store.add_at(new_job("Backend Engineer"), now).unwrap();

        assert_eq!(job.id, format!("job-{}", now.timestamp_millis()));
        assert_eq!(job.applications, 0);
        assert_eq!(job.created_at, now);
        assert_eq!(job.updated_at, now);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_ids_monotonic_within_same_millisecond() {
        let mut store = JobStore::default();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let a = store.add_at(new_job("A"), now).unwrap();
        let b = store.add_at(new_job("B"), now).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(b.id, format!("job-{}", now.timestamp_millis() + 1));
    }

    #[test]
    fn test_duplicate_titles_allowed() {
        let mut store = JobStore::default();
        store.add(new_job("Designer")).unwrap();
        store.add(new_job("Designer")).unwrap();
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_get_by_id_missing_returns_none() {
        let store = JobStore::default();
        assert!(store.get_by_id("job-404").is_none());
    }

    #[test]
    fn test_blank_required_fields_rejected() {
        let mut store = JobStore::default();
        let mut job = new_job("  ");
        job.location = String::new();
        let err = store.add(job).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("title"));
                assert!(msg.contains("location"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_skills_trimmed_and_deduplicated() {
        let mut store = JobStore::default();
        let mut job = new_job("Platform Engineer");
        job.skills = vec![
            " Rust ".to_string(),
            "Rust".to_string(),
            "".to_string(),
            "Kubernetes".to_string(),
        ];
        let job = store.add(job).unwrap();
        assert_eq!(job.skills, vec!["Rust", "Kubernetes"]);
    }

    #[test]
    fn test_blank_requirements_dropped_and_ids_assigned() {
        let mut store = JobStore::default();
        let mut job = new_job("SRE");
        job.requirements = vec![
            NewJobRequirement {
                id: None,
                description: "3+ years on-call".to_string(),
                is_required: true,
            },
            NewJobRequirement {
                id: None,
                description: "   ".to_string(),
                is_required: false,
            },
        ];
        let job = store.add(job).unwrap();
        assert_eq!(job.requirements.len(), 1);
        assert_eq!(job.requirements[0].id, "1");
    }

    #[test]
    fn test_search_matches_department_and_filters_status() {
        let mut store = JobStore::default();
        store.add(new_job("Backend Engineer")).unwrap();
        let mut draft = new_job("Data Analyst");
        draft.department = "Analytics".to_string();
        draft.status = JobStatus::Draft;
        store.add(draft).unwrap();

        assert_eq!(store.search(Some("analytics"), None).len(), 1);
        assert_eq!(store.search(None, Some(JobStatus::Draft)).len(), 1);
        assert_eq!(store.search(Some("engineer"), Some(JobStatus::Draft)).len(), 0);
        assert_eq!(store.search(Some("  "), None).len(), 2);
    }
}
