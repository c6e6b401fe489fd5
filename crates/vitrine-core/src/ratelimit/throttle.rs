//! Leading-edge throttle.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

use crate::sync::lock;
use crate::{Error, Result};

/// Leading-edge throttle around a target callback.
///
/// The first call in an idle period runs the target immediately and opens a
/// cooldown window of `limit`. Calls that land inside the window are dropped,
/// never deferred. Once the window has elapsed the next call fires again.
pub struct Throttle<F> {
    target: F,
    limit: Duration,
    /// End of the current cooldown window, if one is open
    cooldown_until: Mutex<Option<Instant>>,
}

impl<F> Throttle<F> {
    /// Wrap `target` so it runs at most once per `limit`.
    pub fn new(target: F, limit: Duration) -> Result<Self> {
        if limit.is_zero() {
            return Err(Error::InvalidInterval { what: "throttle" });
        }
        Ok(Self {
            target,
            limit,
            cooldown_until: Mutex::new(None),
        })
    }

    /// Invoke the target unless a cooldown is active.
    ///
    /// Returns the target's result for accepted calls and `None` for dropped
    /// ones.
    pub fn call<A, R>(&self, args: A) -> Option<R>
    where
        F: Fn(A) -> R,
    {
        let now = Instant::now();
        {
            let mut cooldown = lock(&self.cooldown_until);
            if let Some(until) = *cooldown {
                if now < until {
                    trace!(remaining_ms = (until - now).as_millis() as u64, "throttle: call dropped");
                    return None;
                }
            }
            *cooldown = Some(now + self.limit);
        }
        // The lock is released before running the target so it may re-enter.
        Some((self.target)(args))
    }

    /// Whether a call made now would be dropped
    pub fn is_cooling(&self) -> bool {
        lock(&self.cooldown_until).is_some_and(|until| Instant::now() < until)
    }

    /// Close any open cooldown window.
    pub fn cancel(&self) {
        *lock(&self.cooldown_until) = None;
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::sleep;

    fn recording() -> (Arc<Mutex<Vec<(u64, u32)>>>, impl Fn(u32) + Send + Sync) {
        let start = Instant::now();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let target = move |value: u32| {
            let at = (Instant::now() - start).as_millis() as u64;
            sink.lock().unwrap().push((at, value));
        };
        (calls, target)
    }

    #[test]
    fn test_zero_limit_rejected() {
        let result = Throttle::new(|_: ()| {}, Duration::ZERO);
        assert!(matches!(result, Err(Error::InvalidInterval { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drops_calls_inside_window() {
        let (calls, target) = recording();
        let throttle = Throttle::new(target, Duration::from_millis(16)).unwrap();

        throttle.call(1);
        sleep(Duration::from_millis(5)).await;
        throttle.call(2);
        sleep(Duration::from_millis(15)).await;
        throttle.call(3);

        let calls = calls.lock().unwrap().clone();
        assert_eq!(calls, vec![(0, 1), (20, 3)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_trailing_call() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let throttle = Throttle::new(
            move |_: ()| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            Duration::from_millis(16),
        )
        .unwrap();

        throttle.call(());
        sleep(Duration::from_millis(15)).await;
        throttle.call(());
        sleep(Duration::from_millis(100)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!throttle.is_cooling());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_again_exactly_at_limit() {
        let throttle = Throttle::new(|v: u32| v * 2, Duration::from_millis(16)).unwrap();

        assert_eq!(throttle.call(1), Some(2));
        assert!(throttle.is_cooling());
        sleep(Duration::from_millis(16)).await;
        assert_eq!(throttle.call(2), Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_reopens() {
        let throttle = Throttle::new(|v: u32| v, Duration::from_millis(100)).unwrap();

        assert_eq!(throttle.call(1), Some(1));
        assert_eq!(throttle.call(2), None);
        throttle.cancel();
        assert_eq!(throttle.call(3), Some(3));
    }

    #[test]
    fn test_target_result_propagates() {
        let throttle = Throttle::new(
            |v: i32| -> std::result::Result<i32, String> {
                if v < 0 {
                    Err("negative".to_string())
                } else {
                    Ok(v)
                }
            },
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(throttle.call(-1), Some(Err("negative".to_string())));
    }
}
