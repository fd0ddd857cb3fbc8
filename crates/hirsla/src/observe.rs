//! # Observers — Subscriber Lists and Unsubscribe Handles
//!
//! An [`Observers<T>`] is a list of callbacks taking `&T`. Subscribing returns
//! a [`Subscription`] that removes the callback again when
//! [`unsubscribe`](Subscription::unsubscribe) is called.
//!
//! Notification iterates a snapshot of the list, so a callback may subscribe
//! or unsubscribe (itself or others) while being notified. Callbacks added
//! during a notification are not called until the next one.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`).

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

/// A list of callbacks for values of type `T`.
pub(crate) struct Observers<T: ?Sized> {
    next_id: Cell<u64>,
    callbacks: RefCell<Vec<(u64, Callback<T>)>>,
}

impl<T: ?Sized + 'static> Observers<T> {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            next_id: Cell::new(0),
            callbacks: RefCell::new(Vec::new()),
        })
    }

    pub fn subscribe(self: &Rc<Self>, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let callback: Callback<T> = Rc::new(RefCell::new(callback));
        self.callbacks.borrow_mut().push((id, callback));

        let list: Rc<dyn Detach> = self.clone();
        Subscription {
            list: Rc::downgrade(&list),
            id,
        }
    }

    /// Call every subscriber with `value`.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in snapshot {
            // A callback that re-enters its own list is skipped.
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)(value);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}

trait Detach {
    fn detach(&self, id: u64) -> bool;
}

impl<T: ?Sized> Detach for Observers<T> {
    fn detach(&self, id: u64) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(other, _)| *other != id);
        callbacks.len() != before
    }
}

/// Handle returned by every `observe_*` call.
///
/// Dropping the handle keeps the subscription alive; call
/// [`unsubscribe`](Self::unsubscribe) to stop receiving notifications.
pub struct Subscription {
    list: Weak<dyn Detach>,
    id: u64,
}

impl Subscription {
    /// Remove the callback. Returns `false` if it was already gone (or the
    /// store it observed was dropped).
    pub fn unsubscribe(self) -> bool {
        self.list
            .upgrade()
            .is_some_and(|list| list.detach(self.id))
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
