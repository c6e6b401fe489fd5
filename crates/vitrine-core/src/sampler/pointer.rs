use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use super::PointerEvent;
use crate::config::SamplerConfig;
use crate::listener::{EventSource, Subscription};
use crate::ratelimit::{FrameScheduler, FrameThrottle, Throttle};
use crate::Result;

/// How pointer moves are rate-limited before publishing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerMode {
    /// At most one sample per frame, carrying the latest position
    #[default]
    Frame,
    /// Leading-edge throttle with the configured window
    Throttle,
    /// Every move is published
    Raw,
}

/// Pointer position in host coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

type Publish = Arc<dyn Fn(PointerSample) + Send + Sync>;
type Target = Box<dyn Fn(PointerSample) + Send + Sync>;

enum Limiter {
    Frame(Arc<FrameThrottle<PointerSample, Target>>),
    Throttle(Arc<Throttle<Target>>),
    Raw(Publish),
}

impl Limiter {
    fn forward(&self, sample: PointerSample) {
        match self {
            Limiter::Frame(frame) => frame.call(sample),
            Limiter::Throttle(throttle) => {
                throttle.call(sample);
            }
            Limiter::Raw(publish) => publish(sample),
        }
    }

    fn cancel(&self) {
        match self {
            Limiter::Frame(frame) => frame.cancel(),
            Limiter::Throttle(throttle) => throttle.cancel(),
            Limiter::Raw(_) => {}
        }
    }
}

/// Publishes the latest pointer position for the cursor follower.
pub struct PointerSampler {
    mode: PointerMode,
    tx: Arc<watch::Sender<PointerSample>>,
    limiter: Arc<Limiter>,
    subscription: Option<Subscription>,
}

impl PointerSampler {
    pub fn new(
        mode: PointerMode,
        throttle: Duration,
        frames: Arc<dyn FrameScheduler>,
    ) -> Result<Self> {
        let (tx, _) = watch::channel(PointerSample::default());
        let tx = Arc::new(tx);

        let publisher = Arc::clone(&tx);
        let publish: Publish = Arc::new(move |sample| {
            publisher.send_replace(sample);
        });

        let target = |publish: Publish| -> Target { Box::new(move |sample| publish(sample)) };
        let limiter = match mode {
            PointerMode::Frame => Limiter::Frame(Arc::new(FrameThrottle::new(target(publish), frames))),
            PointerMode::Throttle => {
                Limiter::Throttle(Arc::new(Throttle::new(target(publish), throttle)?))
            }
            PointerMode::Raw => Limiter::Raw(publish),
        };

        Ok(Self {
            mode,
            tx,
            limiter: Arc::new(limiter),
            subscription: None,
        })
    }

    pub fn from_config(config: &SamplerConfig, frames: Arc<dyn FrameScheduler>) -> Result<Self> {
        Self::new(config.pointer_mode, config.pointer_throttle(), frames)
    }

    /// Subscribe to `source`. Starting twice keeps the first subscription.
    pub fn start(&mut self, source: &EventSource<PointerEvent>) {
        if self.subscription.is_some() {
            return;
        }
        let limiter = Arc::clone(&self.limiter);
        self.subscription = Some(source.listen(move |event: &PointerEvent| {
            limiter.forward(PointerSample {
                x: event.x,
                y: event.y,
            });
        }));
        debug!(mode = ?self.mode, "Pointer sampler started");
    }

    /// Unsubscribe and drop any sample still waiting for its frame.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
            self.limiter.cancel();
            debug!("Pointer sampler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn mode(&self) -> PointerMode {
        self.mode
    }

    pub fn latest(&self) -> PointerSample {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PointerSample> {
        self.tx.subscribe()
    }
}

impl Drop for PointerSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::FrameLoop;
    use tokio::time::sleep;

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent { x, y }
    }

    #[test]
    fn test_frame_mode_keeps_latest_position() {
        let frames = Arc::new(FrameLoop::new());
        let source = EventSource::new();
        let mut sampler =
            PointerSampler::new(PointerMode::Frame, Duration::from_millis(16), frames.clone()).unwrap();
        sampler.start(&source);

        source.emit(&moved(1.0, 1.0));
        source.emit(&moved(2.0, 3.0));
        source.emit(&moved(5.0, 8.0));
        assert_eq!(sampler.latest(), PointerSample::default());
        assert_eq!(frames.pending(), 1);

        frames.run_frame();
        assert_eq!(sampler.latest(), PointerSample { x: 5.0, y: 8.0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttle_mode_drops_inside_window() {
        let frames = Arc::new(FrameLoop::new());
        let source = EventSource::new();
        let mut sampler =
            PointerSampler::new(PointerMode::Throttle, Duration::from_millis(16), frames).unwrap();
        sampler.start(&source);

        source.emit(&moved(1.0, 1.0));
        source.emit(&moved(2.0, 2.0));
        assert_eq!(sampler.latest(), PointerSample { x: 1.0, y: 1.0 });

        sleep(Duration::from_millis(16)).await;
        source.emit(&moved(3.0, 3.0));
        assert_eq!(sampler.latest(), PointerSample { x: 3.0, y: 3.0 });
    }

    #[test]
    fn test_raw_mode_publishes_every_move() {
        let frames = Arc::new(FrameLoop::new());
        let source = EventSource::new();
        let mut sampler =
            PointerSampler::new(PointerMode::Raw, Duration::from_millis(16), frames).unwrap();
        let rx = sampler.subscribe();
        sampler.start(&source);

        source.emit(&moved(4.0, 2.0));
        assert_eq!(*rx.borrow(), PointerSample { x: 4.0, y: 2.0 });
        source.emit(&moved(6.0, 1.0));
        assert_eq!(*rx.borrow(), PointerSample { x: 6.0, y: 1.0 });
    }

    #[test]
    fn test_stop_cancels_pending_frame() {
        let frames = Arc::new(FrameLoop::new());
        let source = EventSource::new();
        let mut sampler =
            PointerSampler::new(PointerMode::Frame, Duration::from_millis(16), frames.clone()).unwrap();
        sampler.start(&source);

        source.emit(&moved(9.0, 9.0));
        sampler.stop();
        frames.run_frame();
        assert_eq!(sampler.latest(), PointerSample::default());
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_mode_names() {
        let mode: PointerMode = serde_json::from_str("\"throttle\"").unwrap();
        assert_eq!(mode, PointerMode::Throttle);
        assert_eq!(PointerMode::default(), PointerMode::Frame);
    }
}
