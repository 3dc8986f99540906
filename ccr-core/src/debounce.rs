//! Trailing-edge debouncer
//!
//! Every call restarts the quiet period. Only the most recent call runs, once the
//! period has elapsed with no further calls. A call that has already started
//! running is never interrupted by a later one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action`, superseding any call still waiting out its delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn call<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) != ticket {
                trace!(ticket, "debounced call superseded");
                return;
            }
            action.await;
        }));
    }

    /// Drop the waiting call, if any.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.pending = None;
    }

    /// True while the latest call is waiting out its delay or still running.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
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
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_call_runs() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let (tx, mut rx) = mpsc::unbounded_channel();

        for value in ["o", "or", "ord"] {
            let tx = tx.clone();
            debouncer.call(async move {
                let _ = tx.send(value);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(rx.try_recv().ok(), Some("ord"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_quiet_period() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        debouncer.call(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_waiting_call() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        debouncer.call(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_call_is_not_interrupted() {
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let first = tx.clone();
        debouncer.call(async move {
            // Simulates a slow fetch that outlives the next call.
            tokio::time::sleep(Duration::from_secs(2)).await;
            let _ = first.send("slow");
        });

        tokio::time::sleep(Duration::from_millis(600)).await;
        debouncer.call(async move {
            let _ = tx.send("fast");
        });

        tokio::time::sleep(Duration::from_secs(3)).await;
        let mut received = Vec::new();
        while let Ok(value) = rx.try_recv() {
            received.push(value);
        }
        assert_eq!(received, vec!["fast", "slow"]);
    }
}
