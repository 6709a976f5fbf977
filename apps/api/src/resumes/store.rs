use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{
    candidate_id_for, ResumeRecord, ResumeStatus, StatusCounts, StatusExtra, UploadedFile,
};

/// Uploaded résumé metadata and analysis lifecycle.
///
/// Mutations on unknown ids are silent no-ops: simulator timers may still
/// fire after a record was removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeStore {
    resumes: Vec<ResumeRecord>,
}

impl ResumeStore {
    /// Registers new files as `pending`, not uploaded, not analyzed.
    /// Returns the created records so the caller can start their upload.
    pub fn add_many(&mut self, files: Vec<UploadedFile>) -> Vec<ResumeRecord> {
        let now = Utc::now();
        let created: Vec<ResumeRecord> = files
            .into_iter()
            .map(|f| ResumeRecord {
                id: Uuid::new_v4().to_string(),
                name: f.name,
                size: f.size,
                mime_type: f.mime_type,
                uploaded: false,
                status: ResumeStatus::Pending,
                analyzed: false,
                uploaded_at: now,
                analyzed_at: None,
                error: None,
                match_score: None,
                keywords: None,
                job_id: None,
                candidate_id: None,
            })
            .collect();
        self.resumes.extend(created.iter().cloned());
        created
    }

    /// Merges `status` and the `Some` fields of `extra` into the record.
    ///
    /// The record is then normalized: `analyzed` follows `status == Completed`,
    /// `analyzed_at` is restamped on every `Completed` update and dropped otherwise,
    /// `error` survives only on `Failed`, score and keywords only on `Completed`.
    /// Returns `false` when the id is unknown.
    pub fn update_status(&mut self, id: &str, status: ResumeStatus, extra: StatusExtra) -> bool {
        let Some(record) = self.resumes.iter_mut().find(|r| r.id == id) else {
            return false;
        };

        record.status = status;

        if let Some(error) = extra.error {
            record.error = Some(error);
        }
        if let Some(score) = extra.match_score {
            record.match_score = Some(score.min(100));
        }
        if let Some(keywords) = extra.keywords {
            record.keywords = Some(keywords);
        }
        if let Some(uploaded) = extra.uploaded {
            record.uploaded = uploaded;
        }

        record.analyzed = status == ResumeStatus::Completed;
        if record.analyzed {
            record.analyzed_at = Some(Utc::now());
        } else {
            record.analyzed_at = None;
            record.match_score = None;
            record.keywords = None;
        }
        if status != ResumeStatus::Failed {
            record.error = None;
        }
        true
    }

    /// Manual retry: `Failed → Pending`. Returns `Ok(false)` for an unknown id.
    pub fn retry(&mut self, id: &str) -> Result<bool, AppError> {
        let Some(record) = self.resumes.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        if !record.status.can_transition_to(ResumeStatus::Pending) {
            return Err(AppError::InvalidTransition(format!(
                "resume {id} is {}, only failed resumes can be retried",
                record.status.as_str()
            )));
        }

        // The stale error is kept until the next pass moves the record to processing.
        record.status = ResumeStatus::Pending;
        record.analyzed = false;
        record.analyzed_at = None;
        Ok(true)
    }

    pub fn mark_uploaded(&mut self, ids: &[String]) -> usize {
        let mut marked = 0;
        for record in self.resumes.iter_mut().filter(|r| ids.contains(&r.id)) {
            record.uploaded = true;
            marked += 1;
        }
        marked
    }

    /// Links records to a job. Sets `candidate_id` but never creates a candidate.
    pub fn mark_for_conversion(&mut self, resume_ids: &[String], job_id: &str) -> usize {
        let mut marked = 0;
        for record in self.resumes.iter_mut().filter(|r| resume_ids.contains(&r.id)) {
            record.job_id = Some(job_id.to_string());
            record.candidate_id = Some(candidate_id_for(&record.id));
            marked += 1;
        }
        marked
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.resumes.len();
        self.resumes.retain(|r| r.id != id);
        self.resumes.len() != before
    }

    pub fn clear(&mut self) -> Vec<String> {
        self.resumes.drain(..).map(|r| r.id).collect()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&ResumeRecord> {
        self.resumes.iter().find(|r| r.id == id)
    }

    pub fn list(&self) -> &[ResumeRecord] {
        &self.resumes
    }

    /// Records waiting for analysis, in insertion order.
    pub fn pending_uploaded_ids(&self) -> Vec<String> {
        self.resumes
            .iter()
            .filter(|r| r.uploaded && r.status == ResumeStatus::Pending)
            .map(|r| r.id.clone())
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        StatusCounts::tally(&self.resumes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            size: 2048,
            mime_type: "application/pdf".to_string(),
        }
    }

    fn assert_invariants(store: &ResumeStore) {
        for r in store.list() {
            assert_eq!(r.analyzed, r.status == ResumeStatus::Completed, "{}", r.id);
            assert_eq!(r.analyzed_at.is_some(), r.analyzed, "{}", r.id);
            if r.status != ResumeStatus::Failed {
                assert!(r.error.is_none(), "{}", r.id);
            }
            if r.status != ResumeStatus::Completed {
                assert!(r.match_score.is_none() && r.keywords.is_none(), "{}", r.id);
            }
        }
    }

    #[test]
    fn test_add_many_creates_pending_records() {
        let mut store = ResumeStore::default();
        let created = store.add_many(vec![file("a.pdf"), file("b.pdf"), file("c.txt")]);

        assert_eq!(created.len(), 3);
        assert_eq!(store.list().len(), 3);
        for r in &created {
            assert_eq!(r.status, ResumeStatus::Pending);
            assert!(!r.uploaded);
            assert!(!r.analyzed);
        }
        assert_ne!(created[0].id, created[1].id);
    }

    #[test]
    fn test_completed_stamps_analyzed_at() {
        let mut store = ResumeStore::default();
        let id = store.add_many(vec![file("a.pdf")])[0].id.clone();

        let updated = store.update_status(
            &id,
            ResumeStatus::Completed,
            StatusExtra {
                match_score: Some(87),
                keywords: Some(vec!["Rust".to_string()]),
                ..StatusExtra::default()
            },
        );
        assert!(updated);

        let r = store.get_by_id(&id).unwrap();
        assert!(r.analyzed);
        assert!(r.analyzed_at.is_some());
        assert_eq!(r.match_score, Some(87));
        assert_invariants(&store);
    }

    #[test]
    fn test_completed_again_restamps_analyzed_at() {
        let mut store = ResumeStore::default();
        let id = store.add_many(vec![file("a.pdf")])[0].id.clone();
        store.update_status(&id, ResumeStatus::Completed, StatusExtra::default());

        let stale = Utc::now() - chrono::Duration::days(3);
        store.resumes[0].analyzed_at = Some(stale);
        store.update_status(&id, ResumeStatus::Completed, StatusExtra::default());

        let r = store.get_by_id(&id).unwrap();
        assert!(r.analyzed_at.unwrap() > stale);
        assert_invariants(&store);
    }

    #[test]
    fn test_leaving_completed_clears_analysis_fields() {
        let mut store = ResumeStore::default();
        let id = store.add_many(vec![file("a.pdf")])[0].id.clone();
        store.update_status(
            &id,
            ResumeStatus::Completed,
            StatusExtra {
                match_score: Some(70),
                ..StatusExtra::default()
            },
        );
        store.update_status(&id, ResumeStatus::Processing, StatusExtra::default());

        let r = store.get_by_id(&id).unwrap();
        assert!(!r.analyzed);
        assert!(r.analyzed_at.is_none());
        assert!(r.match_score.is_none());
        assert_invariants(&store);
    }

    #[test]
    fn test_error_only_kept_on_failed() {
        let mut store = ResumeStore::default();
        let id = store.add_many(vec![file("a.pdf")])[0].id.clone();
        store.update_status(
            &id,
            ResumeStatus::Processing,
            StatusExtra {
                error: Some("ignored".to_string()),
                ..StatusExtra::default()
            },
        );
        assert!(store.get_by_id(&id).unwrap().error.is_none());

        store.update_status(
            &id,
            ResumeStatus::Failed,
            StatusExtra {
                error: Some("Analysis failed".to_string()),
                ..StatusExtra::default()
            },
        );
        assert_eq!(
            store.get_by_id(&id).unwrap().error.as_deref(),
            Some("Analysis failed")
        );
        assert_invariants(&store);
    }

    #[test]
    fn test_match_score_clamped() {
        let mut store = ResumeStore::default();
        let id = store.add_many(vec![file("a.pdf")])[0].id.clone();
        store.update_status(
            &id,
            ResumeStatus::Completed,
            StatusExtra {
                match_score: Some(250),
                ..StatusExtra::default()
            },
        );
        assert_eq!(store.get_by_id(&id).unwrap().match_score, Some(100));
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let mut store = ResumeStore::default();
        store.add_many(vec![file("a.pdf")]);
        let snapshot = store.list().to_vec();
        assert!(!store.update_status("ghost", ResumeStatus::Failed, StatusExtra::default()));
        assert_eq!(store.list(), snapshot.as_slice());
    }

    #[test]
    fn test_retry_failed_goes_back_to_pending() {
        let mut store = ResumeStore::default();
        let id = store.add_many(vec![file("a.pdf")])[0].id.clone();
        store.mark_uploaded(&[id.clone()]);
        store.update_status(&id, ResumeStatus::Processing, StatusExtra::default());
        store.update_status(
            &id,
            ResumeStatus::Failed,
            StatusExtra {
                error: Some("Analysis failed".to_string()),
                ..StatusExtra::default()
            },
        );

        assert!(store.retry(&id).unwrap());
        let r = store.get_by_id(&id).unwrap();
        assert_eq!(r.status, ResumeStatus::Pending);
        assert!(!r.analyzed);
        assert!(r.uploaded);
        assert_eq!(store.pending_uploaded_ids(), vec![id.clone()]);

        // Next pass clears the stale error.
        store.update_status(&id, ResumeStatus::Processing, StatusExtra::default());
        assert!(store.get_by_id(&id).unwrap().error.is_none());
    }

    #[test]
    fn test_retry_rejects_non_failed() {
        let mut store = ResumeStore::default();
        let id = store.add_many(vec![file("a.pdf")])[0].id.clone();
        store.update_status(&id, ResumeStatus::Completed, StatusExtra::default());
        assert!(matches!(
            store.retry(&id),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_retry_missing_returns_false() {
        let mut store = ResumeStore::default();
        assert!(!store.retry("ghost").unwrap());
    }

    #[test]
    fn test_mark_for_conversion_sets_link() {
        let mut store = ResumeStore::default();
        let created = store.add_many(vec![file("a.pdf"), file("b.pdf"), file("c.pdf")]);
        let ids = vec![created[0].id.clone(), created[1].id.clone()];

        assert_eq!(store.mark_for_conversion(&ids, "job-42"), 2);

        for id in &ids {
            let r = store.get_by_id(id).unwrap();
            assert_eq!(r.job_id.as_deref(), Some("job-42"));
            assert_eq!(r.candidate_id, Some(format!("candidate-{id}")));
        }
        let untouched = store.get_by_id(&created[2].id).unwrap();
        assert!(untouched.job_id.is_none() && untouched.candidate_id.is_none());
    }

    #[test]
    fn test_pending_queue_requires_upload() {
        let mut store = ResumeStore::default();
        let created = store.add_many(vec![file("a.pdf"), file("b.pdf")]);
        assert!(store.pending_uploaded_ids().is_empty());
        store.mark_uploaded(&[created[1].id.clone()]);
        assert_eq!(store.pending_uploaded_ids(), vec![created[1].id.clone()]);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = ResumeStore::default();
        let created = store.add_many(vec![file("a.pdf"), file("b.pdf")]);
        assert!(store.remove(&created[0].id));
        assert!(!store.remove(&created[0].id));
        assert_eq!(store.list().len(), 1);

        let cleared = store.clear();
        assert_eq!(cleared, vec![created[1].id.clone()]);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_status_counts() {
        let mut store = ResumeStore::default();
        let created = store.add_many(vec![file("a.pdf"), file("b.pdf"), file("c.pdf")]);
        store.mark_uploaded(&[created[0].id.clone(), created[1].id.clone()]);
        store.update_status(&created[0].id, ResumeStatus::Completed, StatusExtra::default());
        store.update_status(&created[1].id, ResumeStatus::Failed, StatusExtra::default());

        let counts = store.status_counts();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.uploaded, 2);
    }
}
