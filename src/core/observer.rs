//! Listener lists with RAII disposers
//!
//! `subscribe` returns a [`Subscription`]; dropping it (or calling
//! [`Subscription::unsubscribe`]) removes the listener. Listeners are invoked
//! synchronously, in registration order, by [`Observers::notify`].

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    listeners: BTreeMap<u64, Listener<T>>,
}

/// A typed observer list.
pub struct Observers<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Observers<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<T: 'static> Observers<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: BTreeMap::new(),
            })),
        }
    }

    /// Register a listener. It stays registered while the returned
    /// subscription is alive.
    #[must_use = "dropping the subscription unregisters the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let mut reg = self.registry.lock();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.insert(id, Arc::new(listener));
        drop(reg);

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            dispose: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.lock().listeners.remove(&id);
                }
            })),
        }
    }

    /// Invoke every listener with `value`. Returns the number of listeners called.
    ///
    /// The lock is released before listeners run, so a listener may
    /// subscribe or unsubscribe without deadlocking.
    pub fn notify(&self, value: &T) -> usize {
        let listeners: Vec<Listener<T>> = self.registry.lock().listeners.values().cloned().collect();
        for listener in &listeners {
            listener(value);
        }
        listeners.len()
    }

    pub fn len(&self) -> usize {
        self.registry.lock().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Disposer returned by [`Observers::subscribe`].
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Unregister now. Equivalent to dropping.
    pub fn unsubscribe(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn notify_reaches_all_live_listeners() {
        let observers: Observers<u32> = Observers::new();
        let sum = Arc::new(AtomicUsize::new(0));

        let s1 = {
            let sum = sum.clone();
            observers.subscribe(move |v| {
                sum.fetch_add(*v as usize, Ordering::SeqCst);
            })
        };
        let s2 = {
            let sum = sum.clone();
            observers.subscribe(move |v| {
                sum.fetch_add(*v as usize * 10, Ordering::SeqCst);
            })
        };

        assert_eq!(observers.notify(&2), 2);
        assert_eq!(sum.load(Ordering::SeqCst), 22);

        drop(s1);
        assert_eq!(observers.notify(&1), 1);
        assert_eq!(sum.load(Ordering::SeqCst), 32);

        s2.unsubscribe();
        assert!(observers.is_empty());
        assert_eq!(observers.notify(&1), 0);
    }

    #[test]
    fn subscription_outliving_observers_is_harmless() {
        let observers: Observers<()> = Observers::new();
        let sub = observers.subscribe(|_| {});
        drop(observers);
        drop(sub);
    }

    #[test]
    fn listener_can_unsubscribe_others_during_notify() {
        let observers: Observers<()> = Observers::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let victim = observers.subscribe(|_| {});
        *slot.lock() = Some(victim);

        let slot_clone = slot.clone();
        let _killer = observers.subscribe(move |_| {
            slot_clone.lock().take();
        });

        observers.notify(&());
        assert_eq!(observers.len(), 1);
    }
}
