use std::time::Duration;

use crate::{Error, Result};

/// Cyclic index over a list of items, advanced on a fixed interval.
///
/// The index is always valid for the current list: `0..len`, or `0` when the
/// list is empty. Lists of zero or one item never move.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationState<T> {
    items: Vec<T>,
    current: usize,
    interval: Duration,
}

impl<T> RotationState<T> {
    pub fn new(items: Vec<T>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::InvalidInterval { what: "rotation" });
        }
        Ok(Self {
            items,
            current: 0,
            interval,
        })
    }

    /// Move to the next item, wrapping at the end. Returns the new index.
    pub fn advance(&mut self) -> usize {
        if self.items.len() > 1 {
            self.current = (self.current + 1) % self.items.len();
        }
        self.current
    }

    /// Jump straight to `index`. Out-of-range indexes are rejected.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Replace the items, resetting to the first one if the current index
    /// would fall off the end.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        if self.current >= self.items.len() {
            self.current = 0;
        }
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_item(&self) -> Option<&T> {
        self.items.get(self.current)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether advancing can ever change the index
    pub fn is_static(&self) -> bool {
        self.items.len() <= 1
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
