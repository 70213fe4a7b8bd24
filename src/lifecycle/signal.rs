//! Single-threaded multicast event source.

use super::scope::Scope;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle to one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Slots<T> {
    next: u64,
    handlers: Vec<(SubscriptionId, Handler<T>)>,
}

/// Event source that any number of listeners subscribe to.
///
/// Listeners may subscribe or unsubscribe (themselves included) while an
/// event is being delivered. A listener removed during delivery is not
/// called afterwards; one added during delivery first sees the next event.
pub struct Signal<T> {
    slots: Rc<RefCell<Slots<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Slots {
                next: 0,
                handlers: Vec::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let mut slots = self.slots.borrow_mut();
        slots.next += 1;
        let id = SubscriptionId(slots.next);
        let handler: Handler<T> = Rc::new(RefCell::new(handler));
        slots.handlers.push((id, handler));
        id
    }

    /// Subscribe for the lifetime of `scope`.
    pub fn subscribe_in<F>(&self, scope: &mut Scope, handler: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = self.subscribe(handler);
        let weak = self.downgrade();
        scope.register(move || {
            if let Some(signal) = weak.upgrade() {
                signal.unsubscribe(id);
            }
        });
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.handlers.len();
        slots.handlers.retain(|(s, _)| *s != id);
        slots.handlers.len() != before
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.slots.borrow().handlers.iter().any(|(s, _)| *s == id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().handlers.len()
    }

    /// Deliver `value` to every current subscriber in subscription order.
    pub fn emit(&self, value: &T) {
        let snapshot: Vec<(SubscriptionId, Handler<T>)> = self
            .slots
            .borrow()
            .handlers
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect();

        for (id, handler) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            // A handler that re-emits on its own signal is not re-entered.
            let Ok(mut handler) = handler.try_borrow_mut() else {
                tracing::trace!("skipping re-entrant signal handler");
                continue;
            };
            (*handler)(value);
        }
    }

    pub fn downgrade(&self) -> WeakSignal<T> {
        WeakSignal {
            slots: Rc::downgrade(&self.slots),
        }
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.slots.try_borrow().map(|s| s.handlers.len()).ok();
        f.debug_struct("Signal").field("subscribers", &count).finish()
    }
}

/// Non-owning reference to a [`Signal`].
pub struct WeakSignal<T> {
    slots: Weak<RefCell<Slots<T>>>,
}

impl<T> Clone for WeakSignal<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Weak::clone(&self.slots),
        }
    }
}

impl<T> WeakSignal<T> {
    pub fn upgrade(&self) -> Option<Signal<T>> {
        self.slots.upgrade().map(|slots| Signal { slots })
    }
}
