use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Signal::connect`], used to disconnect later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<A> = Rc<RefCell<dyn FnMut(&A)>>;

/// A synchronous, single-threaded signal.
///
/// Subscribers are invoked in connection order, directly on the
/// emitter's call stack. There is no queueing: by the time [`emit`]
/// returns, every subscriber has run.
///
/// Emission works on a snapshot of the subscriber list, so a callback
/// may connect or disconnect subscribers (including itself) without
/// skipping or duplicating the other callbacks of that emission.
///
/// [`emit`]: Signal::emit
pub struct Signal<A> {
    slots: RefCell<Vec<(SubscriptionId, Callback<A>)>>,
    next_id: Cell<u64>,
}

impl<A> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Signal<A> {
    /// Create a signal with no subscribers.
    pub fn new() -> Self {
        Self {
            slots: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Register a callback. Callbacks run in connection order.
    pub fn connect(&self, callback: impl FnMut(&A) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.slots
            .borrow_mut()
            .push((id, Rc::new(RefCell::new(callback))));
        id
    }

    /// Remove a previously connected callback. Returns whether the
    /// subscription was still present.
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        let mut slots = self.slots.borrow_mut();
        let before = slots.len();
        slots.retain(|(slot_id, _)| *slot_id != id);
        slots.len() < before
    }

    /// Invoke every current subscriber with the given arguments.
    pub fn emit(&self, args: &A) {
        let snapshot: Vec<Callback<A>> = self
            .slots
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            (callback.borrow_mut())(args);
        }
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().len()
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
