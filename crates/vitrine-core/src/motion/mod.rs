//! Animation configuration
//!
//! - `easing` - easing curves for tweens and smooth scrolling
//! - `timing` - progress and interpolation helpers
//! - `spring` - damped spring simulation and the 2-D follower
//! - `variants` - hidden/visible poses, stagger and reveal settings
//! - `drift` - looping back-and-forth particle drift

pub mod drift;
pub mod easing;
pub mod spring;
pub mod timing;
pub mod variants;

pub use drift::{ping_pong, Particle, ParticleField};
pub use easing::EasingType;
pub use spring::{Spring, SpringConfig, SpringFollower};
pub use variants::{fade_in_up, header_entrance, scale_in, Pose, RevealConfig, Stagger, Transition, Variant};
