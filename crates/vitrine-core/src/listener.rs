//! Listener registration with scoped disposal
//!
//! The host pushes raw events (scroll, pointer move) into an [`EventSource`];
//! consumers register with [`EventSource::listen`] and get a [`Subscription`]
//! back. Dropping the subscription removes the listener, so a consumer that
//! bails out early cannot leave a callback firing into freed state.

use std::sync::{Arc, Mutex, Weak};

use crate::sync::lock;

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

/// Fan-out point for one kind of host event
pub struct EventSource<E> {
    registry: Arc<Mutex<Registry<E>>>,
}

impl<E> Default for EventSource<E> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }
}

impl<E: 'static> EventSource<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`; it stays registered until the returned
    /// subscription is disposed or dropped.
    #[must_use = "dropping the subscription removes the listener immediately"]
    pub fn listen<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = lock(&self.registry);
            registry.next_id += 1;
            let id = registry.next_id;
            registry.listeners.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.registry);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).listeners.retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    /// Deliver `event` to every listener registered at the time of the call.
    ///
    /// Returns the number of listeners notified.
    pub fn emit(&self, event: &E) -> usize {
        // Snapshot so listeners may subscribe or unsubscribe while running.
        let listeners: Vec<Listener<E>> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &listeners {
            listener(event);
        }
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

/// Disposer for a registered listener
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_listeners() {
        let source = EventSource::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));

        let a = Arc::clone(&total);
        let _first = source.listen(move |v| {
            a.fetch_add(*v as usize, Ordering::SeqCst);
        });
        let b = Arc::clone(&total);
        let _second = source.listen(move |v| {
            b.fetch_add(*v as usize * 10, Ordering::SeqCst);
        });

        assert_eq!(source.emit(&2), 2);
        assert_eq!(total.load(Ordering::SeqCst), 22);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let source = EventSource::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let subscription = source.listen(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        source.emit(&());
        drop(subscription);
        source.emit(&());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_dispose_only_removes_own_listener() {
        let source = EventSource::<()>::new();
        let keep = source.listen(|_| {});
        let gone = source.listen(|_| {});

        gone.dispose();
        assert_eq!(source.listener_count(), 1);
        drop(keep);
        assert_eq!(source.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_source() {
        let source = EventSource::<()>::new();
        let subscription = source.listen(|_| {});
        drop(source);
        drop(subscription);
    }
}
