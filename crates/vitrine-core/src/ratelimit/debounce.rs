//! Trailing-edge debounce.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::sync::lock;
use crate::{Error, Result};

/// Debounce around a target callback.
///
/// Every call cancels the pending invocation and schedules a new one `wait`
/// later with the latest arguments, so the target only ever sees the last
/// call of a burst.
pub struct Debounce<F> {
    target: Arc<F>,
    wait: Duration,
    runtime: Handle,
    pending: Arc<Mutex<Pending>>,
}

/// The scheduled invocation, if any.
///
/// `generation` is bumped on every call and cancel; a scheduled task only
/// fires if its generation is still current when it takes the slot.
#[derive(Default)]
struct Pending {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Pending {
    fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Claim the slot for `generation`; false if it was superseded
    fn claim(&mut self, generation: u64) -> bool {
        if self.generation != generation {
            return false;
        }
        self.handle = None;
        true
    }
}

impl<F> Debounce<F> {
    /// Wrap `target` so it fires `wait` after the last call.
    ///
    /// Must be called from within a tokio runtime; the runtime handle is
    /// captured for scheduling.
    pub fn new(target: F, wait: Duration) -> Result<Self> {
        if wait.is_zero() {
            return Err(Error::InvalidInterval { what: "debounce" });
        }
        let runtime = Handle::try_current().map_err(|e| Error::NoRuntime(e.to_string()))?;
        Ok(Self {
            target: Arc::new(target),
            wait,
            runtime,
            pending: Arc::new(Mutex::new(Pending::default())),
        })
    }

    /// Schedule the target with `args`, replacing any pending invocation.
    pub fn call<A>(&self, args: A)
    where
        F: Fn(A) + Send + Sync + 'static,
        A: Send + 'static,
    {
        let mut pending = lock(&self.pending);
        if pending.handle.is_some() {
            trace!("debounce: replacing pending invocation");
        }
        pending.cancel();

        let generation = pending.generation;
        let slot = Arc::clone(&self.pending);
        let target = Arc::clone(&self.target);
        let wait = self.wait;

        pending.handle = Some(self.runtime.spawn(async move {
            tokio::time::sleep(wait).await;
            let claimed = lock(&slot).claim(generation);
            if claimed {
                target(args);
            }
        }));
    }

    /// Whether an invocation is scheduled and has not fired yet
    pub fn is_pending(&self) -> bool {
        lock(&self.pending)
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Drop the pending invocation, if any.
    pub fn cancel(&self) {
        lock(&self.pending).cancel();
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }
}

impl<F> Drop for Debounce<F> {
    fn drop(&mut self) {
        self.cancel();
    }
}
