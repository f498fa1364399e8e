//! Single-slot debounced scheduling for remote writes.
//!
//! A remote write is scheduled after every store change and restarted by
//! the next one, so a burst of edits produces one write once the author
//! pauses. At most one write is pending at any time.
//!
//! [`Debouncer`] is runtime-agnostic: the caller supplies the current
//! instant and polls for due payloads. [`TokioDebouncer`] (feature
//! `tokio-scheduler`) runs the same policy as a spawned tokio task.

use std::time::{Duration, Instant};

/// Default delay between the last store change and the remote write.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1200);

#[derive(Debug)]
struct Pending<T> {
    payload: T,
    deadline: Instant,
}

/// Cancel-and-reschedule delayed slot holding one payload.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Create an idle debouncer.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `payload` to become due `delay` after `now`.
    ///
    /// Any pending payload is dropped and its timer restarted. Returns
    /// `true` if a pending payload was replaced.
    pub fn schedule(&mut self, payload: T, now: Instant) -> bool {
        let replaced = self.pending.is_some();
        self.pending = Some(Pending {
            payload,
            deadline: now + self.delay,
        });
        replaced
    }

    /// Swap the pending payload without touching its deadline.
    ///
    /// Returns `false`, dropping `payload`, when nothing is pending.
    pub fn replace_payload(&mut self, payload: T) -> bool {
        match &mut self.pending {
            Some(pending) => {
                pending.payload = payload;
                true
            }
            None => false,
        }
    }

    /// Take the payload if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if pending.deadline <= now => self.pending.take().map(|p| p.payload),
            _ => None,
        }
    }

    /// Take the pending payload regardless of its deadline.
    pub fn take_now(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    /// Drop the pending payload, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.take_now()
    }

    /// Whether a payload is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending payload becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }
}

#[cfg(feature = "tokio-scheduler")]
pub use tokio_debouncer::TokioDebouncer;

#[cfg(feature = "tokio-scheduler")]
mod tokio_debouncer {
    use std::future::Future;
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::task::JoinHandle;

    /// Debouncer that runs the scheduled task on the tokio runtime.
    ///
    /// Each [`schedule`](Self::schedule) aborts the previously spawned task
    /// and spawns a new one that sleeps for the delay before running. The
    /// pending task is aborted on [`cancel`](Self::cancel) and on drop.
    pub struct TokioDebouncer {
        delay: Duration,
        handle: Mutex<Option<JoinHandle<()>>>,
    }

    impl TokioDebouncer {
        /// Create an idle debouncer. Must be used within a tokio runtime.
        pub fn new(delay: Duration) -> Self {
            Self {
                delay,
                handle: Mutex::new(None),
            }
        }

        /// Run `task` after the delay, replacing any pending task.
        pub fn schedule<F, Fut>(&self, task: F)
        where
            F: FnOnce() -> Fut + Send + 'static,
            Fut: Future<Output = ()> + Send + 'static,
        {
            let delay = self.delay;
            let handle = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                task().await;
            });
            let previous = self
                .handle
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .replace(handle);
            if let Some(previous) = previous {
                previous.abort();
            }
        }

        /// Abort the pending task, if any.
        pub fn cancel(&self) {
            if let Some(handle) = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take() {
                handle.abort();
            }
        }

        /// Whether a scheduled task has not finished yet.
        pub fn is_pending(&self) -> bool {
            self.handle
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .as_ref()
                .is_some_and(|h| !h.is_finished())
        }
    }

    impl Drop for TokioDebouncer {
        fn drop(&mut self) {
            self.cancel();
        }
    }
}


#[cfg(all(test, feature = "tokio-scheduler"))]
mod tokio_tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_tokio_debouncer_runs_last_task_once() {
        let debouncer = TokioDebouncer::new(Duration::from_millis(100));
        let runs = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));

        for value in 1..=3 {
            let runs = Arc::clone(&runs);
            let last = Arc::clone(&last);
            debouncer.schedule(move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                last.store(value, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_debouncer_cancel() {
        let debouncer = TokioDebouncer::new(Duration::from_millis(100));
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        debouncer.schedule(move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());

        debouncer.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
