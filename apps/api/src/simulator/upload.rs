use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{BusyGuard, Simulator, UploadProgress};
use crate::errors::AppError;
use crate::notifications::NotificationLevel;

const MIN_TICKS: u32 = 5;
const MAX_TICKS: u32 = 40;

/// Number of progress ticks for a selection, so a larger selection takes longer.
pub fn upload_ticks(files: usize, ticks_per_file: u32) -> u32 {
    let files = u32::try_from(files).unwrap_or(u32::MAX);
    files.saturating_mul(ticks_per_file).clamp(MIN_TICKS, MAX_TICKS)
}

fn percent(tick: u32, ticks: u32) -> u8 {
    (u64::from(tick) * 100 / u64::from(ticks.max(1))).min(100) as u8
}

impl Simulator {
    /// Starts a background upload for `resume_ids`. The returned handle
    /// resolves once the records are marked uploaded.
    ///
    /// Fails with `Conflict` while another upload is still in flight.
    pub fn start_upload(&self, resume_ids: Vec<String>) -> Result<JoinHandle<()>, AppError> {
        let guard = self.begin_upload()?;
        let sim = self.clone();
        Ok(tokio::spawn(async move {
            sim.perform_upload(guard, resume_ids).await;
        }))
    }

    fn begin_upload(&self) -> Result<BusyGuard, AppError> {
        BusyGuard::acquire(&self.inner.uploading)
            .ok_or_else(|| AppError::Conflict("an upload is already in progress".to_string()))
    }

    async fn perform_upload(&self, _guard: BusyGuard, resume_ids: Vec<String>) -> usize {
        let settings = &self.inner.settings;
        let files = resume_ids.len();
        let ticks = upload_ticks(files, settings.upload_ticks_per_file);
        info!(files, ticks, "Upload started");

        self.inner.progress.send_replace(UploadProgress {
            in_flight: true,
            files,
            percent: 0,
        });

        for tick in 1..=ticks {
            tokio::select! {
                _ = self.inner.shutdown.cancelled() => {
                    warn!(files, tick, "Upload interrupted by shutdown");
                    self.inner.progress.send_modify(|p| p.in_flight = false);
                    return 0;
                }
                _ = tokio::time::sleep(settings.upload_tick) => {}
            }
            self.inner.progress.send_modify(|p| p.percent = percent(tick, ticks));
        }

        // Uploaded records must reach the analysis queue even if this save fails.
        let marked = self
            .inner
            .stores
            .resumes
            .write_best_effort(|store| store.mark_uploaded(&resume_ids))
            .await;
        self.inner.progress.send_modify(|p| p.in_flight = false);

        info!(files, marked, "Upload complete");
        self.inner.notifier.publish(
            NotificationLevel::Success,
            "Upload complete",
            format!("{marked} resume(s) uploaded and queued for analysis"),
        );
        self.wake();
        marked
    }
}
