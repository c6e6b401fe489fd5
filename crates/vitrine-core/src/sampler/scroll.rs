use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::ScrollEvent;
use crate::config::SamplerConfig;
use crate::listener::{EventSource, Subscription};
use crate::ratelimit::Throttle;
use crate::Result;

/// Fraction of the section height the hero background drifts at full scroll
const PARALLAX_SPAN: f64 = 0.5;

/// Published scroll position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Vertical offset, never negative
    pub scroll_y: f64,
    pub timestamp: Instant,
}

type Publish = Box<dyn Fn(f64) + Send + Sync>;

/// Throttled scroll sampler
///
/// Listens to raw scroll events, forwards at most one per throttle window and
/// publishes the result on a watch channel.
pub struct ScrollSampler {
    header_threshold: f64,
    tx: Arc<watch::Sender<ScrollSample>>,
    throttle: Arc<Throttle<Publish>>,
    subscription: Option<Subscription>,
}

impl ScrollSampler {
    pub fn new(throttle: Duration, header_threshold: f64) -> Result<Self> {
        let (tx, _) = watch::channel(ScrollSample {
            scroll_y: 0.0,
            timestamp: Instant::now(),
        });
        let tx = Arc::new(tx);

        let publisher = Arc::clone(&tx);
        let publish: Publish = Box::new(move |offset_y| {
            let scroll_y = if offset_y.is_finite() { offset_y.max(0.0) } else { 0.0 };
            publisher.send_modify(|sample| {
                // Instants are monotonic; max() keeps that true for callers
                // that build samples across threads.
                sample.timestamp = Instant::now().max(sample.timestamp);
                sample.scroll_y = scroll_y;
            });
            trace!(scroll_y, "scroll sample published");
        });

        Ok(Self {
            header_threshold,
            tx,
            throttle: Arc::new(Throttle::new(publish, throttle)?),
            subscription: None,
        })
    }

    pub fn from_config(config: &SamplerConfig) -> Result<Self> {
        Self::new(config.scroll_throttle(), config.header_threshold)
    }

    /// Subscribe to `source`. Starting twice keeps the first subscription.
    pub fn start(&mut self, source: &EventSource<ScrollEvent>) {
        if self.subscription.is_some() {
            return;
        }
        let throttle = Arc::clone(&self.throttle);
        self.subscription = Some(source.listen(move |event: &ScrollEvent| {
            throttle.call(event.offset_y);
        }));
        debug!(throttle_ms = self.throttle.limit().as_millis() as u64, "Scroll sampler started");
    }

    /// Unsubscribe; no samples are published afterwards.
    pub fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
            self.throttle.cancel();
            debug!("Scroll sampler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn latest(&self) -> ScrollSample {
        *self.tx.borrow()
    }

    pub fn scroll_y(&self) -> f64 {
        self.tx.borrow().scroll_y
    }

    /// Whether the page has scrolled past the header threshold
    pub fn is_scrolled(&self) -> bool {
        self.scroll_y() > self.header_threshold
    }

    /// Scroll position as a fraction of `max_scroll`
    pub fn scroll_progress(&self, max_scroll: f64) -> f64 {
        scroll_progress(self.scroll_y(), max_scroll)
    }

    /// Parallax offset for a section `height` tall
    pub fn parallax_offset(&self, max_scroll: f64, height: f64) -> f64 {
        parallax_offset(self.scroll_progress(max_scroll), height)
    }

    pub fn subscribe(&self) -> watch::Receiver<ScrollSample> {
        self.tx.subscribe()
    }
}

impl Drop for ScrollSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `scroll_y / max_scroll`, clamped to [0, 1]
pub fn scroll_progress(scroll_y: f64, max_scroll: f64) -> f64 {
    if max_scroll <= 0.0 {
        return 0.0;
    }
    (scroll_y / max_scroll).clamp(0.0, 1.0)
}

/// Map scroll progress [0, 1] onto [0, 50%] of `height`
pub fn parallax_offset(progress: f64, height: f64) -> f64 {
    progress.clamp(0.0, 1.0) * PARALLAX_SPAN * height
}
