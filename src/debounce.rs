//! Single-slot debouncing scheduler.
//!
//! Each [`trigger`](Debouncer::trigger) replaces the pending task: the old
//! one is aborted and the new one runs once the quiet interval has passed
//! without another trigger. A burst of any size therefore runs exactly one
//! task, the last one.

use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Debouncer {
    quiet: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Schedule `task` after the quiet interval, cancelling whatever was pending.
    ///
    /// Must be called from within a tokio runtime.
    pub fn trigger<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let quiet = self.quiet;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            task();
        });

        let mut slot = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Drop the pending task, if any, without running it.
    pub fn cancel(&self) {
        let mut slot = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.take() {
            previous.abort();
        }
    }

    /// Wait for the pending task, if any, to run.
    pub async fn flush(&self) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = pending {
            let _ = handle.await;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> Arc<AtomicUsize> {
        Arc::new(AtomicUsize::new(0))
    }

    #[tokio::test(start_paused = true)]
    async fn burst_runs_last_task_once() {
        let debouncer = Debouncer::new(Duration::from_millis(140));
        let runs = counter();
        let last = counter();

        for i in 1..=5 {
            let runs = runs.clone();
            let last = last.clone();
            debouncer.trigger(move || {
                runs.fetch_add(1, Ordering::SeqCst);
                last.store(i, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn quiet_gap_runs_each() {
        let debouncer = Debouncer::new(Duration::from_millis(140));
        let runs = counter();

        for _ in 0..2 {
            let runs = runs.clone();
            debouncer.trigger(move || {
                runs.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(300)).await;
        }

        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(140));
        let runs = counter();
        let r = runs.clone();
        debouncer.trigger(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_waits_for_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(140));
        let runs = counter();
        let r = runs.clone();
        debouncer.trigger(move || {
            r.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.flush().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        debouncer.flush().await;
    }
}
