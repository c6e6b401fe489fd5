//! Smooth page scrolling
//!
//! `ScrollAnimator` eases the page offset towards its target using the
//! curves from `vitrine_core::motion`.

pub mod animation;
pub mod config;

pub use animation::ScrollAnimator;
pub use config::{ScrollConfig, ScrollConfigExt};
