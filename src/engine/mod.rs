//! Runtime engine.
//!
//! This module is the imperative shell: it owns the one mutable field
//! (the live state), the listener list, and optional history, and runs
//! hooks and listeners synchronously inside `send`.
//!
//! # Ordering
//!
//! A successful `send` runs, in order:
//! 1. the old state's exit hook
//! 2. the state change
//! 3. the new state's enter hook
//! 4. every listener registered when notification began, in registration order
//!
//! Lookup failures are detected before step 1, so a failed `send` changes
//! nothing. A `send` issued from inside a hook or listener of the same
//! engine is rejected with [`TransitionError::Reentrant`].

mod error;
mod machine;
mod subscription;

pub use error::TransitionError;
pub use machine::Machine;
pub use subscription::{Listener, Subscription};
