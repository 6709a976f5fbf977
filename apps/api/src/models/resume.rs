use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a résumé through simulated analysis.
///
/// `Pending → Processing → {Completed | Failed}`, plus the manual retry edge
/// `Failed → Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ResumeStatus {
    /// Edges the simulator and the retry action are allowed to take.
    /// Manual overrides through `update_status` are not checked against this.
    pub fn can_transition_to(self, next: ResumeStatus) -> bool {
        matches!(
            (self, next),
            (ResumeStatus::Pending, ResumeStatus::Processing)
                | (ResumeStatus::Processing, ResumeStatus::Completed)
                | (ResumeStatus::Processing, ResumeStatus::Failed)
                | (ResumeStatus::Failed, ResumeStatus::Pending)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResumeStatus::Pending => "pending",
            ResumeStatus::Processing => "processing",
            ResumeStatus::Completed => "completed",
            ResumeStatus::Failed => "failed",
        }
    }
}

/// Raw file selection before intake. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResumeRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded: bool,
    pub status: ResumeStatus,
    pub analyzed: bool,
    pub uploaded_at: DateTime<Utc>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub match_score: Option<u8>,
    pub keywords: Option<Vec<String>>,
    pub job_id: Option<String>,
    pub candidate_id: Option<String>,
}

/// Optional fields merged into a record alongside a status change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusExtra {
    pub error: Option<String>,
    pub match_score: Option<u8>,
    pub keywords: Option<Vec<String>>,
    pub uploaded: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub uploaded: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn tally(records: &[ResumeRecord]) -> Self {
        let mut counts = StatusCounts {
            total: records.len(),
            ..StatusCounts::default()
        };
        for r in records {
            match r.status {
                ResumeStatus::Pending => counts.pending += 1,
                ResumeStatus::Processing => counts.processing += 1,
                ResumeStatus::Completed => counts.completed += 1,
                ResumeStatus::Failed => counts.failed += 1,
            }
            if r.uploaded {
                counts.uploaded += 1;
            }
        }
        counts
    }
}

/// `candidate-<resume id>`, the only link between a résumé and its derived candidate.
pub fn candidate_id_for(resume_id: &str) -> String {
    format!("candidate-{resume_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        assert!(ResumeStatus::Pending.can_transition_to(ResumeStatus::Processing));
        assert!(ResumeStatus::Processing.can_transition_to(ResumeStatus::Completed));
        assert!(ResumeStatus::Processing.can_transition_to(ResumeStatus::Failed));
        assert!(ResumeStatus::Failed.can_transition_to(ResumeStatus::Pending));
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!ResumeStatus::Pending.can_transition_to(ResumeStatus::Completed));
        assert!(!ResumeStatus::Completed.can_transition_to(ResumeStatus::Pending));
        assert!(!ResumeStatus::Completed.can_transition_to(ResumeStatus::Failed));
        assert!(!ResumeStatus::Failed.can_transition_to(ResumeStatus::Completed));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ResumeStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }

    #[test]
    fn test_candidate_id_format() {
        assert_eq!(candidate_id_for("r1"), "candidate-r1");
    }
}
