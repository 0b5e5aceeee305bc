use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts outstanding crawl tasks so the run can wait for every task,
/// including ones spawned after the wait started.
#[derive(Clone, Default)]
pub struct TaskTracker {
    outstanding: Arc<AtomicUsize>,
    done: Arc<Notify>,
}

/// Held by a task for its whole lifetime.
pub struct TaskGuard {
    outstanding: Arc<AtomicUsize>,
    done: Arc<Notify>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            // notify_one stores a permit, so a waiter that has not polled yet
            // still wakes up.
            self.done.notify_one();
        }
    }
}

impl TaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. A parent must call this for its child before its own
    /// guard drops.
    pub fn enter(&self) -> TaskGuard {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            outstanding: self.outstanding.clone(),
            done: self.done.clone(),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        while self.outstanding() != 0 {
            self.done.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_immediately_when_idle() {
        let tracker = TaskTracker::new();
        tokio::time::timeout(Duration::from_millis(50), tracker.wait())
            .await
            .expect("idle tracker should not block");
    }

    #[tokio::test]
    async fn test_wait_covers_tasks_spawned_by_tasks() {
        let tracker = TaskTracker::new();
        let finished = Arc::new(AtomicUsize::new(0));

        let guard = tracker.enter();
        let child_tracker = tracker.clone();
        let counter = finished.clone();
        tokio::spawn(async move {
            let _guard = guard;
            tokio::time::sleep(Duration::from_millis(10)).await;

            let child_guard = child_tracker.enter();
            let counter_inner = counter.clone();
            tokio::spawn(async move {
                let _guard = child_guard;
                tokio::time::sleep(Duration::from_millis(20)).await;
                counter_inner.fetch_add(1, Ordering::SeqCst);
            });

            counter.fetch_add(1, Ordering::SeqCst);
        });

        tracker.wait().await;
        assert_eq!(finished.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.outstanding(), 0);
    }
}
