pub mod config;
pub mod error;
pub mod listener;
pub mod motion;
pub mod profile;
pub mod ratelimit;
pub mod rotation;
pub mod sampler;
pub mod sync;
pub mod viewport;

pub use config::{AppConfig, ScrollConfig};
pub use error::{Error, Result};
pub use listener::{EventSource, Subscription};
pub use motion::EasingType;
pub use profile::Profile;
pub use rotation::{RotationState, Rotator};
pub use viewport::{create_viewport_observer, ObserverOptions, ViewportObserver};
