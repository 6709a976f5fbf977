use serde::Serialize;

use crate::errors::AppError;
use crate::models::resume::{ResumeRecord, UploadedFile};
use crate::notifications::{NotificationLevel, Notifier};
use crate::resumes::store::ResumeStore;
use crate::storage::Persisted;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "docx", "doc", "txt"];

#[derive(Debug, Clone, Serialize)]
pub struct IntakeOutcome {
    pub created: Vec<ResumeRecord>,
    /// File names refused at intake. They never reach the store.
    pub rejected: Vec<String>,
}

/// Lowercased text after the last `.`, if any.
pub fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

pub fn is_supported(name: &str) -> bool {
    extension_of(name).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Splits a selection into (accepted, rejected), preserving order.
pub fn partition_files(files: Vec<UploadedFile>) -> (Vec<UploadedFile>, Vec<UploadedFile>) {
    files.into_iter().partition(|f| is_supported(&f.name))
}

/// Validates a selection and registers the accepted subset as pending résumés.
///
/// Publishes a single error notification when anything was rejected.
pub async fn intake_files(
    resumes: &Persisted<ResumeStore>,
    notifier: &Notifier,
    files: Vec<UploadedFile>,
) -> Result<IntakeOutcome, AppError> {
    let (accepted, rejected) = partition_files(files);
    let rejected: Vec<String> = rejected.into_iter().map(|f| f.name).collect();

    if !rejected.is_empty() {
        notifier.publish(
            NotificationLevel::Error,
            "Unsupported format",
            format!(
                "Only PDF, DOCX, DOC and TXT files are accepted. Rejected: {}",
                rejected.join(", ")
            ),
        );
    }

    let created = if accepted.is_empty() {
        Vec::new()
    } else {
        resumes.write(|store| store.add_many(accepted)).await?
    };

    Ok(IntakeOutcome { created, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationLevel;
    use crate::storage::{FlakySnapshotStore, MemorySnapshotStore, Partition, SnapshotStore};
    use std::sync::Arc;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            size: 100,
            mime_type: "application/octet-stream".to_string(),
        }
    }

    fn empty_store() -> Persisted<ResumeStore> {
        let backend: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::default());
        Persisted::new(ResumeStore::default(), Partition::Resumes, backend)
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(is_supported("CV.PDF"));
        assert!(is_supported("notes.Docx"));
        assert!(is_supported("old.doc"));
        assert!(is_supported("plain.txt"));
    }

    #[test]
    fn test_unsupported_extensions() {
        assert!(!is_supported("setup.exe"));
        assert!(!is_supported("resume"));
        assert!(!is_supported("resume."));
        assert!(!is_supported("archive.pdf.zip"));
    }

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(extension_of("john.doe.cv.pdf").as_deref(), Some("pdf"));
        assert_eq!(extension_of("noext"), None);
    }

    #[tokio::test]
    async fn test_valid_batch_creates_all() {
        let store = empty_store();
        let notifier = Notifier::new();
        let outcome = intake_files(&store, &notifier, vec![file("a.pdf"), file("b.txt")])
            .await
            .unwrap();

        assert_eq!(outcome.created.len(), 2);
        assert!(outcome.rejected.is_empty());
        assert_eq!(store.read().await.list().len(), 2);
        assert!(notifier.recent().is_empty());
    }

    #[tokio::test]
    async fn test_mixed_batch_creates_valid_subset_and_notifies_once() {
        let store = empty_store();
        let notifier = Notifier::new();
        let outcome = intake_files(
            &store,
            &notifier,
            vec![file("a.pdf"), file("virus.exe"), file("b.pdf"), file("img.png")],
        )
        .await
        .unwrap();

        assert_eq!(outcome.created.len(), 2);
        assert_eq!(outcome.rejected, vec!["virus.exe", "img.png"]);
        assert_eq!(store.read().await.list().len(), 2);

        let recent = notifier.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].level, NotificationLevel::Error);
        assert!(recent[0].description.contains("virus.exe"));
    }

    #[tokio::test]
    async fn test_all_rejected_leaves_store_untouched() {
        let store = empty_store();
        let notifier = Notifier::new();
        let outcome = intake_files(&store, &notifier, vec![file("x.exe")]).await.unwrap();
        assert!(outcome.created.is_empty());
        assert!(store.read().await.list().is_empty());
        assert_eq!(notifier.recent().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_creates_nothing() {
        let backend = Arc::new(FlakySnapshotStore::default());
        let store = Persisted::new(ResumeStore::default(), Partition::Resumes, backend.clone());
        backend.set_failing(true);

        let err = intake_files(&store, &Notifier::new(), vec![file("a.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert!(store.read().await.list().is_empty());
    }
}
