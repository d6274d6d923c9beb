//! Process wide pointer listener registrations.
//!
//! Pointer move and end events are only routed to the column controller while
//! it holds a [`ListenerHandle`]. The handle is the disposer: releasing it, or
//! dropping it together with its owner, removes the registration.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use tracing::trace;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    active: BTreeSet<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct GlobalListeners {
    registry: Rc<RefCell<Registry>>,
}

impl GlobalListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the move and end listeners.
    pub fn install(&self) -> ListenerHandle {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.active.insert(id);
        trace!("Installed pointer listeners #{id}");
        ListenerHandle {
            id,
            registry: Rc::downgrade(&self.registry),
            released: false,
        }
    }

    /// Whether move and end events currently have a receiver.
    pub fn is_listening(&self) -> bool {
        !self.registry.borrow().active.is_empty()
    }

    pub fn registrations(&self) -> usize {
        self.registry.borrow().active.len()
    }
}

#[derive(Debug)]
pub struct ListenerHandle {
    id: u64,
    registry: Weak<RefCell<Registry>>,
    released: bool,
}

impl ListenerHandle {
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().active.remove(&self.id);
            trace!("Removed pointer listeners #{}", self.id);
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_release_removes_registration() {
        let listeners = GlobalListeners::new();
        assert!(!listeners.is_listening());

        let handle = listeners.install();
        assert!(listeners.is_listening());
        assert_eq!(listeners.registrations(), 1);

        handle.release();
        assert!(!listeners.is_listening());
    }

    #[test]
    fn dropping_handle_removes_registration() {
        let listeners = GlobalListeners::new();
        {
            let _handle = listeners.install();
            let _other = listeners.install();
            assert_eq!(listeners.registrations(), 2);
        }
        assert_eq!(listeners.registrations(), 0);
    }

    #[test]
    fn handle_outliving_target_is_harmless() {
        let listeners = GlobalListeners::new();
        let handle = listeners.install();
        drop(listeners);
        handle.release();
    }
}
