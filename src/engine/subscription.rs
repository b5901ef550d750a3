//! Listener registrations.

use super::machine::Engine;
use std::cell::RefCell;
use std::rc::Weak;

/// Callback invoked with the new state name after every transition.
pub type Listener = std::rc::Rc<dyn Fn(&str)>;

/// Handle to one listener registration, returned by `subscribe`.
///
/// Dropping a `Subscription` does not remove the listener; call
/// [`Subscription::unsubscribe`]. Unsubscribing is idempotent and becomes a
/// no-op once the engine itself is gone.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    engine: Weak<RefCell<Engine>>,
}

impl Subscription {
    pub(super) fn new(id: u64, engine: Weak<RefCell<Engine>>) -> Self {
        Self { id, engine }
    }

    /// Remove exactly this registration.
    pub fn unsubscribe(&self) {
        if let Some(engine) = self.engine.upgrade() {
            engine.borrow_mut().remove_listener(self.id);
        }
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.engine
            .upgrade()
            .is_some_and(|engine| engine.borrow().has_listener(self.id))
    }
}
