//! Per-key debouncing
//!
//! Each key owns at most one waiting task. Scheduling again for the same key
//! before the delay elapses aborts the waiting task and starts a new wait,
//! so a burst of triggers collapses into one run after the burst settles.
//! A task whose delay already elapsed is left to finish.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Default coalescing window for member updates
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

struct Pending {
    handle: JoinHandle<()>,
    started: Arc<AtomicBool>,
}

impl Pending {
    fn is_waiting(&self) -> bool {
        !self.started.load(Ordering::SeqCst) && !self.handle.is_finished()
    }
}

/// Keyed map of cancellable delayed tasks
pub struct Debouncer<K> {
    delay: Duration,
    pending: Mutex<HashMap<K, Pending>>,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Debug + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Run `task` after the delay unless superseded by a newer call for `key`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: K, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            flag.store(true, Ordering::SeqCst);
            task.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|_, p| !p.handle.is_finished());

        if let Some(previous) = pending.get(&key) {
            if previous.is_waiting() {
                debug!(key = ?key, "Superseding pending debounced task");
                previous.handle.abort();
            }
        }
        pending.insert(key, Pending { handle, started });
    }

    /// Abort the waiting task for `key`. Returns whether one was waiting.
    pub fn cancel(&self, key: &K) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        match pending.remove(key) {
            Some(p) if p.is_waiting() => {
                p.handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Number of tasks still waiting for their delay
    pub fn waiting(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|p| p.is_waiting())
            .count()
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        for p in pending.values() {
            if !p.started.load(Ordering::SeqCst) {
                p.handle.abort();
            }
        }
    }
}
