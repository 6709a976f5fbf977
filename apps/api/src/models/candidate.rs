use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Position in the hiring pipeline.
///
/// Nominal order is `Applied → … → Hired`, with `Rejected` reachable from
/// anywhere. The store does not enforce it; recruiters may move a candidate
/// to any stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStage {
    Applied,
    Screening,
    Interview,
    Technical,
    Final,
    Offer,
    Hired,
    Rejected,
}

impl CandidateStage {
    pub const ALL: [CandidateStage; 8] = [
        CandidateStage::Applied,
        CandidateStage::Screening,
        CandidateStage::Interview,
        CandidateStage::Technical,
        CandidateStage::Final,
        CandidateStage::Offer,
        CandidateStage::Hired,
        CandidateStage::Rejected,
    ];

    /// Columns shown on the kanban board.
    pub const BOARD: [CandidateStage; 6] = [
        CandidateStage::Applied,
        CandidateStage::Screening,
        CandidateStage::Interview,
        CandidateStage::Technical,
        CandidateStage::Final,
        CandidateStage::Offer,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, CandidateStage::Hired | CandidateStage::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStage::Applied => "applied",
            CandidateStage::Screening => "screening",
            CandidateStage::Interview => "interview",
            CandidateStage::Technical => "technical",
            CandidateStage::Final => "final",
            CandidateStage::Offer => "offer",
            CandidateStage::Hired => "hired",
            CandidateStage::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkExperience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub job_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub resume_url: String,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub stage: CandidateStage,
    pub score: u8,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_stages() {
        let terminal: Vec<_> = CandidateStage::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![CandidateStage::Hired, CandidateStage::Rejected]);
    }

    #[test]
    fn test_board_excludes_terminal_stages() {
        assert!(CandidateStage::BOARD.iter().all(|s| !s.is_terminal()));
        assert_eq!(CandidateStage::BOARD.len(), 6);
    }

    #[test]
    fn test_stage_roundtrips_through_str() {
        for stage in CandidateStage::ALL {
            let json = format!("\"{}\"", stage.as_str());
            let parsed: CandidateStage = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, stage);
        }
    }
}
