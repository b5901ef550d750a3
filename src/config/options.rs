//! Runtime options that are not part of the machine definition.

use crate::core::StateHistory;
use serde::{Deserialize, Serialize};

/// How much transition history an engine keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Record nothing.
    #[default]
    Off,
    /// Record every transition for the lifetime of the engine.
    Unbounded,
    /// Keep only the most recent `n` transitions.
    Bounded(usize),
}

impl HistoryPolicy {
    pub(crate) fn history(self) -> Option<StateHistory> {
        match self {
            Self::Off => None,
            Self::Unbounded => Some(StateHistory::new()),
            Self::Bounded(n) => Some(StateHistory::bounded(n)),
        }
    }
}

/// Options applied when constructing an engine.
///
/// ```rust
/// use typed_fsm::config::{HistoryPolicy, MachineOptions};
///
/// let options: MachineOptions = serde_json::from_str(r#"{"history":{"bounded":16}}"#).unwrap();
/// assert_eq!(options.history, HistoryPolicy::Bounded(16));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    pub history: HistoryPolicy,
}

impl MachineOptions {
    /// Options with history recording set to `policy`.
    pub fn with_history(policy: HistoryPolicy) -> Self {
        Self { history: policy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_disable_history() {
        let options = MachineOptions::default();
        assert_eq!(options.history, HistoryPolicy::Off);
        assert!(options.history.history().is_none());
    }

    #[test]
    fn bounded_policy_produces_bounded_history() {
        let history = HistoryPolicy::Bounded(3).history().unwrap();
        assert_eq!(history.capacity(), Some(3));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: MachineOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, MachineOptions::default());
    }

    #[test]
    fn policy_uses_snake_case_names() {
        let json = serde_json::to_string(&HistoryPolicy::Unbounded).unwrap();
        assert_eq!(json, "\"unbounded\"");
    }
}
