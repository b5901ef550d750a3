//! Core state identity and history types.
//!
//! This module contains the pure, side-effect free pieces shared by the
//! runtime engine and the typed layer:
//! - State identifiers via the `State` trait
//! - Transition records and bounded history

mod history;
mod state;

pub use history::{StateHistory, StateTransition};
pub use state::State;
