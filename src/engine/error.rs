//! Send-time errors.

use thiserror::Error;

/// Errors returned by a `send` that did not transition.
///
/// A failed send never mutates the engine and never fires a hook or
/// listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("no transitions from state '{state}'")]
    NoTransitions { state: String },

    #[error("no transition for event '{event}' from state '{state}'")]
    UnmappedEvent { event: String, state: String },

    /// A hook or listener called `send` on the engine that invoked it.
    #[error("event '{event}' sent to state '{state}' while another transition is in progress")]
    Reentrant { event: String, state: String },

    /// A typed handle's state tag no longer matches the live state.
    #[error("stale handle: machine is in state '{state}', event '{event}' was not sent")]
    StaleHandle { event: String, state: String },
}

impl TransitionError {
    /// The state the machine was in when the send was rejected.
    pub fn state(&self) -> &str {
        match self {
            Self::NoTransitions { state }
            | Self::UnmappedEvent { state, .. }
            | Self::Reentrant { state, .. }
            | Self::StaleHandle { state, .. } => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_event_and_state() {
        let err = TransitionError::UnmappedEvent {
            event: "RESET".to_string(),
            state: "loading".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no transition for event 'RESET' from state 'loading'"
        );

        let err = TransitionError::NoTransitions {
            state: "done".to_string(),
        };
        assert_eq!(err.to_string(), "no transitions from state 'done'");
        assert_eq!(err.state(), "done");
    }
}
