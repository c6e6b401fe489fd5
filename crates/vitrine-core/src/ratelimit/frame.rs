//! Animation-frame scheduling and the frame throttle built on it.
//!
//! The host owns the rendering loop. It hands out a [`FrameScheduler`] so
//! callbacks can be deferred to "just before the next frame", the same role
//! `requestAnimationFrame` plays in a browser. [`FrameLoop`] is the stock
//! implementation: the host calls [`FrameLoop::run_frame`] once per frame, or
//! lets [`FrameLoop::drive`] do it on a timer.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::sync::lock;

/// Identifier of a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

/// Callback run at the start of a frame, receiving the frame timestamp
pub type FrameCallback = Box<dyn FnOnce(Instant) + Send>;

/// Host-provided next-frame scheduling
pub trait FrameScheduler: Send + Sync {
    /// Queue `callback` for the next frame.
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;

    /// Remove a queued callback. Unknown or already-run ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);
}

#[derive(Default)]
struct FrameQueue {
    next_id: u64,
    frames_run: u64,
    callbacks: Vec<(FrameRequestId, FrameCallback)>,
}

/// Host-driven frame loop
#[derive(Default)]
pub struct FrameLoop {
    queue: Mutex<FrameQueue>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every callback queued before this call.
    ///
    /// Callbacks requested while the frame runs are deferred to the next
    /// frame. Returns the number of callbacks run.
    pub fn run_frame(&self) -> usize {
        let callbacks = {
            let mut queue = lock(&self.queue);
            queue.frames_run += 1;
            std::mem::take(&mut queue.callbacks)
        };

        let now = Instant::now();
        let count = callbacks.len();
        for (_, callback) in callbacks {
            callback(now);
        }
        count
    }

    /// Number of callbacks waiting for the next frame
    pub fn pending(&self) -> usize {
        lock(&self.queue).callbacks.len()
    }

    /// Number of frames run so far
    pub fn frames_run(&self) -> u64 {
        lock(&self.queue).frames_run
    }

    /// Run frames at `fps` until `shutdown` flips to true.
    pub async fn drive(self: Arc<Self>, fps: u32, mut shutdown: watch::Receiver<bool>) {
        let period = frame_period(fps);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!("Frame loop started: {} fps", fps.max(1));

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let ran = self.run_frame();
                    if ran > 0 {
                        debug!(callbacks = ran, "frame");
                    }
                }
            }
        }

        info!("Frame loop stopped");
    }
}

impl FrameScheduler for FrameLoop {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let mut queue = lock(&self.queue);
        queue.next_id += 1;
        let id = FrameRequestId(queue.next_id);
        queue.callbacks.push((id, callback));
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        lock(&self.queue).callbacks.retain(|(queued, _)| *queued != id);
    }
}

/// Duration of one frame at `fps`, ~60fps when `fps` is zero
pub fn frame_period(fps: u32) -> Duration {
    if fps == 0 {
        Duration::from_millis(16)
    } else {
        Duration::from_millis(1000 / fps as u64)
    }
}

struct FrameSlot<A> {
    args: Option<A>,
    request: Option<FrameRequestId>,
    /// Token of the outstanding request; stale callbacks carry an older one
    token: u64,
}

struct FrameShared<A, F> {
    target: F,
    slot: Mutex<FrameSlot<A>>,
}

impl<A, F: Fn(A)> FrameShared<A, F> {
    fn fire(&self, token: u64) {
        let args = {
            let mut slot = lock(&self.slot);
            if slot.request.is_none() || slot.token != token {
                return;
            }
            slot.request = None;
            slot.args.take()
        };
        if let Some(args) = args {
            (self.target)(args);
        }
    }
}

/// Coalesces calls into at most one target invocation per frame.
///
/// The invocation carries the arguments of the last call made before the
/// frame fired.
pub struct FrameThrottle<A, F> {
    shared: Arc<FrameShared<A, F>>,
    scheduler: Arc<dyn FrameScheduler>,
}

impl<A, F> FrameThrottle<A, F>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    pub fn new(target: F, scheduler: Arc<dyn FrameScheduler>) -> Self {
        Self {
            shared: Arc::new(FrameShared {
                target,
                slot: Mutex::new(FrameSlot {
                    args: None,
                    request: None,
                    token: 0,
                }),
            }),
            scheduler,
        }
    }

    /// Record `args` and make sure a frame callback is outstanding.
    pub fn call(&self, args: A) {
        let mut slot = lock(&self.shared.slot);
        slot.args = Some(args);
        if slot.request.is_some() {
            return;
        }

        slot.token += 1;
        let token = slot.token;
        let shared = Arc::clone(&self.shared);
        let id = self
            .scheduler
            .request_frame(Box::new(move |_at| shared.fire(token)));
        slot.request = Some(id);
    }
}

impl<A, F> FrameThrottle<A, F> {
    /// Whether a frame callback is outstanding
    pub fn is_pending(&self) -> bool {
        lock(&self.shared.slot).request.is_some()
    }

    /// Drop the pending invocation and its frame request.
    pub fn cancel(&self) {
        let request = {
            let mut slot = lock(&self.shared.slot);
            slot.args = None;
            slot.request.take()
        };
        if let Some(id) = request {
            self.scheduler.cancel_frame(id);
        }
    }
}

impl<A, F> Drop for FrameThrottle<A, F> {
    fn drop(&mut self) {
        self.cancel();
    }
}
