//! Current value plus change notification.
//!
//! The presentation layer subscribes to the observables exposed by the
//! column and filter components and redraws when notified.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;
type Subscribers<T> = RefCell<Vec<(u64, Callback<T>)>>;

pub struct Observable<T> {
    value: T,
    subscribers: Rc<Subscribers<T>>,
    next_id: Cell<u64>,
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<T: PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        if self.value != value {
            self.value = value;
            self.notify();
        }
    }

    /// Mutates the value in place and notifies if `f` reports a change.
    pub fn update(&mut self, f: impl FnOnce(&mut T) -> bool) {
        if f(&mut self.value) {
            self.notify();
        }
    }

    /// Registers `callback` until the returned subscription is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));

        let weak: Weak<Subscribers<T>> = Rc::downgrade(&self.subscribers);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(subscribers) = weak.upgrade() {
                    subscribers.borrow_mut().retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn notify(&self) {
        // Snapshot so callbacks may subscribe or unsubscribe while running.
        let callbacks: Vec<Callback<T>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for cb in callbacks {
            cb(&self.value);
        }
    }
}

/// Keeps a callback registered; dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

/// A dirty flag the render loop polls after a notification.
#[derive(Debug, Clone, Default)]
pub struct RedrawFlag(Rc<Cell<bool>>);

impl RedrawFlag {
    pub fn raise(&self) {
        self.0.set(true);
    }

    /// Returns whether a redraw was requested and lowers the flag.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }

    /// Subscribes the flag to `observable`.
    pub fn watch<T: PartialEq + 'static>(&self, observable: &Observable<T>) -> Subscription {
        let flag = self.clone();
        observable.subscribe(move |_| flag.raise())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_only_on_change() {
        let mut value = Observable::new(1);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = value.subscribe(move |v| sink.borrow_mut().push(*v));

        value.set(1);
        value.set(2);
        value.update(|v| {
            *v += 1;
            true
        });
        value.update(|_| false);

        assert_eq!(*seen.borrow(), vec![2, 3]);
        assert_eq!(*value.get(), 3);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let mut value = Observable::new(String::new());
        let flag = RedrawFlag::default();
        let sub = flag.watch(&value);
        assert_eq!(value.subscriber_count(), 1);

        value.set("a".into());
        assert!(flag.take());
        assert!(!flag.take());

        drop(sub);
        assert_eq!(value.subscriber_count(), 0);
        value.set("b".into());
        assert!(!flag.take());
    }

    #[test]
    fn subscription_outliving_observable_is_harmless() {
        let value = Observable::new(0u8);
        let sub = value.subscribe(|_| {});
        drop(value);
        drop(sub);
    }
}
