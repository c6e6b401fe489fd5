//! Scroll and pointer samplers
//!
//! The host pushes raw events into an [`EventSource`](crate::listener::EventSource);
//! samplers rate-limit them and publish the latest value on a watch channel.

pub mod pointer;
pub mod scroll;

pub use pointer::{PointerMode, PointerSample, PointerSampler};
pub use scroll::{parallax_offset, scroll_progress, ScrollSample, ScrollSampler};

/// Raw scroll notification from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub offset_y: f64,
}

/// Raw pointer move from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}
