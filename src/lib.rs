//! typed-fsm: a minimal state machine runtime with typestate-checked sends
//!
//! A machine is declared once, as data: a set of states, an initial state,
//! and for each state an optional event → target table plus optional
//! enter/exit hooks. From that single table the crate provides two views:
//!
//! - **Runtime engine** ([`engine::Machine`]): validates the table eagerly,
//!   holds the live state, runs hooks and listeners in a fixed order.
//! - **Typestate layer** ([`typed::Handle`]): the [`machine!`] macro derives
//!   the state universe, the events legal from each state, and the target
//!   of each event as types, so an invalid `send` does not compile.
//!
//! # Core Concepts
//!
//! - **Configuration**: plain data ([`config::MachineConfig`]), loadable from JSON
//! - **State**: a closed enum per machine via the [`core::State`] trait
//! - **Handle**: a zero-cost, state-tagged view of one shared engine
//! - **History**: optional record of transitions ([`core::StateHistory`])
//!
//! # Example
//!
//! ```rust
//! use typed_fsm::machine;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! machine! {
//!     pub mod form {
//!         events: [SUBMIT, SUCCESS, ERROR, RETRY, RESET];
//!         initial: Idle;
//!         states: {
//!             Idle { SUBMIT => Loading },
//!             Loading { SUCCESS => Success, ERROR => Failed },
//!             Failed { RETRY => Loading },
//!             Success { RESET => Idle },
//!         }
//!     }
//! }
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//!
//! let idle = form::Handle::start().unwrap();
//! let subscription = idle.subscribe(move |state| sink.borrow_mut().push(state));
//!
//! let idle_again = idle
//!     .send(form::SUBMIT).unwrap()
//!     .send(form::ERROR).unwrap()
//!     .send(form::RETRY).unwrap()
//!     .send(form::SUCCESS).unwrap()
//!     .send(form::RESET).unwrap();
//!
//! subscription.unsubscribe();
//! assert_eq!(idle_again.current(), form::State::Idle);
//! assert_eq!(seen.borrow().len(), 5);
//! ```
//!
//! # Threading
//!
//! Engines are single-threaded (`!Send`). Hooks and listeners run
//! synchronously inside `send`; a `send` issued from inside one of them is
//! rejected rather than queued.

pub mod config;
pub mod core;
pub mod engine;
mod macros;
pub mod snapshot;
pub mod typed;

// Re-export commonly used types
pub use config::{ConfigError, MachineConfig, MachineOptions, StateDefinition};
pub use crate::core::{State, StateHistory, StateTransition};
pub use engine::{Machine, Subscription, TransitionError};
pub use snapshot::Snapshot;
pub use typed::{AnyState, Handle, Or, Schema};
