use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::state::RotationState;
use crate::sync::lock;
use crate::{Error, Result};

struct Inner<T> {
    state: RotationState<T>,
    /// Bumped by every start/stop; a timer task only advances while its
    /// epoch is current.
    epoch: u64,
}

struct Shared<T> {
    inner: Mutex<Inner<T>>,
    index_tx: watch::Sender<usize>,
}

impl<T> Shared<T> {
    /// Advance on behalf of the timer task started at `epoch`.
    fn tick(&self, epoch: u64) -> Option<usize> {
        let mut inner = lock(&self.inner);
        if inner.epoch != epoch {
            return None;
        }
        let index = inner.state.advance();
        self.publish(index);
        Some(index)
    }

    fn publish(&self, index: usize) {
        self.index_tx.send_if_modified(|current| {
            if *current == index {
                false
            } else {
                *current = index;
                true
            }
        });
    }
}

/// Timer-driven carousel
///
/// Owns one [`RotationState`] and, while started, one tokio task that
/// advances it every interval. Index changes are published on a watch
/// channel. Stopping (or dropping) the rotator guarantees no further index
/// changes from the timer.
pub struct Rotator<T> {
    name: String,
    shared: Arc<Shared<T>>,
    task: Option<JoinHandle<()>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl<T: Send + 'static> Rotator<T> {
    pub fn new(name: impl Into<String>, state: RotationState<T>) -> Self {
        let (index_tx, _) = watch::channel(state.current());
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner { state, epoch: 0 }),
                index_tx,
            }),
            task: None,
            shutdown: None,
        }
    }

    /// Start the timer. Starting a running rotator is a no-op.
    ///
    /// Fails when called outside a tokio runtime.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?;

        let (epoch, interval, len) = {
            let mut inner = lock(&self.shared.inner);
            inner.epoch += 1;
            (inner.epoch, inner.state.interval(), inner.state.len())
        };

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();

        self.task = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip the first tick (fires immediately)
            ticker.tick().await;

            loop {
                tokio::select! {
                    result = shutdown_rx.changed() => {
                        if result.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        match shared.tick(epoch) {
                            Some(index) => debug!(rotation = %name, index, "rotation advanced"),
                            None => break,
                        }
                    }
                }
            }
            debug!(rotation = %name, "rotation task finished");
        }));
        self.shutdown = Some(shutdown_tx);

        info!(
            rotation = %self.name,
            items = len,
            interval_ms = interval.as_millis() as u64,
            "Rotation started"
        );
        Ok(())
    }

    /// Stop the timer. The current index is kept.
    pub fn stop(&mut self) {
        lock(&self.shared.inner).epoch += 1;
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        if let Some(task) = self.task.take() {
            task.abort();
            info!(rotation = %self.name, "Rotation stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Jump to `index` without restarting the timer.
    pub fn select(&self, index: usize) -> bool {
        let mut inner = lock(&self.shared.inner);
        let accepted = inner.state.select(index);
        if accepted {
            self.shared.publish(index);
        }
        accepted
    }

    /// Step back one item, wrapping to the end.
    pub fn select_previous(&self) -> usize {
        let mut inner = lock(&self.shared.inner);
        let len = inner.state.len();
        if len > 1 {
            let previous = (inner.state.current() + len - 1) % len;
            inner.state.select(previous);
        }
        let index = inner.state.current();
        self.shared.publish(index);
        index
    }

    /// Step forward one item, wrapping to the start.
    pub fn select_next(&self) -> usize {
        let mut inner = lock(&self.shared.inner);
        let index = inner.state.advance();
        self.shared.publish(index);
        index
    }

    pub fn set_items(&self, items: Vec<T>) {
        let mut inner = lock(&self.shared.inner);
        inner.state.set_items(items);
        let index = inner.state.current();
        self.shared.publish(index);
    }

    pub fn current(&self) -> usize {
        lock(&self.shared.inner).state.current()
    }

    pub fn current_item(&self) -> Option<T>
    where
        T: Clone,
    {
        lock(&self.shared.inner).state.current_item().cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.shared.inner).state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read the state under the lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&RotationState<T>) -> R) -> R {
        f(&lock(&self.shared.inner).state)
    }

    /// Receiver notified whenever the index changes
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.shared.index_tx.subscribe()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Drop for Rotator<T> {
    fn drop(&mut self) {
        lock(&self.shared.inner).epoch += 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    fn rotator(n: usize, interval_ms: u64) -> Rotator<usize> {
        let state = RotationState::new((0..n).collect(), Duration::from_millis(interval_ms)).unwrap();
        Rotator::new("test", state)
    }

    #[test]
    fn test_start_requires_runtime() {
        let mut rotation = rotator(3, 100);
        assert!(matches!(rotation.start(), Err(Error::NoRuntime(_))));
        assert!(!rotation.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_advances_on_interval() {
        let mut rotation = rotator(4, 3000);
        rotation.start().unwrap();

        sleep(Duration::from_millis(2999)).await;
        assert_eq!(rotation.current(), 0);
        sleep(Duration::from_millis(2)).await;
        assert_eq!(rotation.current(), 1);

        sleep(Duration::from_millis(9000)).await;
        assert_eq!(rotation.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_sees_changes() {
        let mut rotation = rotator(2, 100);
        let mut rx = rotation.subscribe();
        rotation.start().unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            rx.changed().await.unwrap();
            seen.push(*rx.borrow_and_update());
        }
        assert_eq!(seen, vec![1, 0, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_item_never_notifies() {
        let mut rotation = rotator(1, 100);
        let rx = rotation.subscribe();
        rotation.start().unwrap();

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(rotation.current(), 0);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_freezes_index() {
        let mut rotation = rotator(4, 100);
        rotation.start().unwrap();
        sleep(Duration::from_millis(250)).await;
        assert_eq!(rotation.current(), 2);

        rotation.stop();
        assert!(!rotation.is_running());
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(rotation.current(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let mut rotation = rotator(3, 100);
        rotation.start().unwrap();
        rotation.stop();
        rotation.start().unwrap();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(rotation.current(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_rotations() {
        let mut about = rotator(4, 3000);
        let mut background = rotator(2, 5000);
        about.start().unwrap();
        background.start().unwrap();

        sleep(Duration::from_millis(15_500)).await;
        assert_eq!(about.current(), 5 % 4);
        assert_eq!(background.current(), 3 % 2);

        about.stop();
        sleep(Duration::from_millis(5000)).await;
        assert_eq!(about.current(), 1);
        assert_eq!(background.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_selection() {
        let rotation = rotator(4, 100);
        assert!(rotation.select(3));
        assert!(!rotation.select(9));
        assert_eq!(rotation.select_next(), 0);
        assert_eq!(rotation.select_previous(), 3);
        assert_eq!(rotation.current_item(), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let mut rotation = rotator(4, 100);
        let rx = rotation.subscribe();
        rotation.start().unwrap();
        drop(rotation);

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(*rx.borrow(), 0);
    }
}
