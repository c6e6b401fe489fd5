//! Event-rate limiting
//!
//! - `throttle` - leading-edge throttle, drops calls during the cooldown
//! - `debounce` - trailing-edge debounce, delivers the last call of a burst
//! - `frame` - frame scheduling and the per-frame throttle
//!
//! Every wrapper owns at most one piece of pending work and releases it on
//! `cancel()` or drop.

mod debounce;
mod frame;
mod throttle;

pub use debounce::Debounce;
pub use frame::{frame_period, FrameCallback, FrameLoop, FrameRequestId, FrameScheduler, FrameThrottle};
pub use throttle::Throttle;
