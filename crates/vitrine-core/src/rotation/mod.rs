//! Timed content rotation (image carousels, background crossfades)
//!
//! - `state` - the pure cyclic index, advanced explicitly
//! - `rotator` - a `RotationState` driven by its own tokio timer

mod rotator;
mod state;

pub use rotator::Rotator;
pub use state::RotationState;
