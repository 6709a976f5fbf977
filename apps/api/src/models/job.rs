use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRequirement {
    pub id: String,
    pub description: String,
    pub is_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub description: String,
    pub requirements: Vec<JobRequirement>,
    pub skills: Vec<String>,
    pub status: JobStatus,
    /// Seeded counter. Not maintained against the candidate store.
    pub applications: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A job as submitted by the new-job form, before id and timestamps are assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type", default = "default_job_type")]
    pub job_type: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<NewJobRequirement>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default = "default_job_status")]
    pub status: JobStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJobRequirement {
    pub id: Option<String>,
    pub description: String,
    #[serde(default = "default_true")]
    pub is_required: bool,
}

fn default_job_type() -> String {
    "full-time".to_string()
}

fn default_job_status() -> JobStatus {
    JobStatus::Published
}

fn default_true() -> bool {
    true
}
