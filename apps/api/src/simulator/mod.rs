//! Simulated upload and analysis.
//!
//! Nothing is transferred or parsed: uploads are a ticking progress value and
//! analysis resolves each résumé after a random delay with a random outcome.
//! The [`Simulator`] handle is cheap to clone; every clone drives the same
//! worker, progress channel and cancellation tokens.

pub mod analysis;
pub mod upload;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;

use crate::notifications::Notifier;
use crate::state::{SharedRng, Stores};

#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub upload_tick: Duration,
    pub upload_ticks_per_file: u32,
    /// Maximum number of résumés in `processing` at once.
    pub batch_size: usize,
    pub success_rate: f64,
    pub base_delay: Duration,
    pub jitter: Duration,
    pub stagger: Duration,
    pub item_timeout: Duration,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            upload_tick: Duration::from_millis(200),
            upload_ticks_per_file: 5,
            batch_size: 10,
            success_rate: 0.95,
            base_delay: Duration::from_millis(1500),
            jitter: Duration::from_millis(1000),
            stagger: Duration::from_millis(200),
            item_timeout: Duration::from_secs(30),
        }
    }
}

/// Snapshot of the single in-flight upload, published on a watch channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub in_flight: bool,
    pub files: usize,
    /// 0..=100
    pub percent: u8,
}

#[derive(Clone)]
pub struct Simulator {
    inner: Arc<Inner>,
}

struct Inner {
    stores: Arc<Stores>,
    notifier: Notifier,
    rng: SharedRng,
    settings: SimulationSettings,
    wake: Notify,
    uploading: Arc<AtomicBool>,
    analyzing: Arc<AtomicBool>,
    shutdown: CancellationToken,
    in_flight: Mutex<HashMap<String, CancellationToken>>,
    progress: watch::Sender<UploadProgress>,
}

/// Clears a busy flag when dropped, so early returns and cancelled futures
/// never leave the simulator stuck.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Simulator {
    pub fn new(
        stores: Arc<Stores>,
        notifier: Notifier,
        rng: SharedRng,
        settings: SimulationSettings,
    ) -> Self {
        let (progress, _) = watch::channel(UploadProgress::default());
        Self {
            inner: Arc::new(Inner {
                stores,
                notifier,
                rng,
                settings,
                wake: Notify::new(),
                uploading: Arc::new(AtomicBool::new(false)),
                analyzing: Arc::new(AtomicBool::new(false)),
                shutdown: CancellationToken::new(),
                in_flight: Mutex::new(HashMap::new()),
                progress,
            }),
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.inner.analyzing.load(Ordering::Acquire)
    }

    pub fn is_uploading(&self) -> bool {
        self.inner.uploading.load(Ordering::Acquire)
    }

    pub fn upload_progress(&self) -> UploadProgress {
        self.inner.progress.borrow().clone()
    }

    /// Asks the worker for an analysis pass. A wake-up sent while the worker is
    /// busy is kept and triggers one more pass afterwards.
    pub fn wake(&self) {
        self.inner.wake.notify_one();
    }

    /// Cancels the pending analysis timer of one résumé, if it has one.
    pub fn cancel(&self, resume_id: &str) -> bool {
        match self.in_flight().remove(resume_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every pending analysis timer. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<CancellationToken> = self.in_flight().drain().map(|(_, t)| t).collect();
        for token in &drained {
            token.cancel();
        }
        drained.len()
    }

    /// Stops the worker, the running upload and every pending timer.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, CancellationToken>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::shared_rng;
    use crate::state::test_support::memory_stores;
    use crate::storage::SnapshotStore;

    pub(super) async fn simulator(settings: SimulationSettings) -> Simulator {
        Simulator::new(
            memory_stores(true).await,
            Notifier::new(),
            shared_rng(Some(7)),
            settings,
        )
    }

    pub(super) async fn simulator_on(
        settings: SimulationSettings,
        backend: Arc<dyn SnapshotStore>,
    ) -> Simulator {
        let stores = Stores::load(backend, true).await.unwrap();
        Simulator::new(Arc::new(stores), Notifier::new(), shared_rng(Some(7)), settings)
    }

    #[test]
    fn test_busy_guard_is_exclusive_and_released_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(BusyGuard::acquire(&flag).is_none());
        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn test_cancel_unknown_id_is_noop() {
        let sim = simulator(SimulationSettings::default()).await;
        assert!(!sim.cancel("nope"));
        assert_eq!(sim.cancel_all(), 0);
        assert!(!sim.is_analyzing());
        assert_eq!(sim.upload_progress(), UploadProgress::default());
    }
}
