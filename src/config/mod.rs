//! Declarative machine configuration.
//!
//! A [`MachineConfig`] is plain data: the set of state names, the initial
//! state, and for each state an optional event → target table plus optional
//! enter/exit hooks. It is the single source of truth for both the runtime
//! engine and the typed layer.
//!
//! Validation uses Stillwater's `Validation` to report every dangling
//! target in one pass instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use typed_fsm::config::MachineConfig;
//!
//! let config = MachineConfig::from_json(r#"{
//!     "initial": "a",
//!     "states": {
//!         "a": { "on": { "GO": "b", "JUMP": "nowhere" } },
//!         "b": { "on": { "BACK": "elsewhere" } }
//!     }
//! }"#).unwrap();
//!
//! let err = config.validate().unwrap_err();
//! assert_eq!(err.violations().len(), 2);
//! assert!(err.to_string().contains("'JUMP'"));
//! assert!(err.to_string().contains("'elsewhere'"));
//! ```

pub mod error;
pub mod options;

pub use error::{ConfigError, ConfigViolation};
pub use options::{HistoryPolicy, MachineOptions};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// A lifecycle callback fired on entering or leaving a state.
pub type Hook = Rc<dyn Fn()>;

/// Definition of one state: its outgoing transitions and lifecycle hooks.
///
/// Hooks are skipped by serialization; only the transition table is data.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StateDefinition {
    /// Event name → target state name. `None` or an empty map means terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<BTreeMap<String, String>>,

    #[serde(skip)]
    pub on_enter: Option<Hook>,

    #[serde(skip)]
    pub on_exit: Option<Hook>,
}

impl StateDefinition {
    /// A state with no outgoing transitions.
    pub fn terminal() -> Self {
        Self::default()
    }

    /// A state whose transitions are the given `(event, target)` pairs.
    ///
    /// An empty iterator yields a terminal state.
    pub fn from_pairs<I, E, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (E, T)>,
        E: Into<String>,
        T: Into<String>,
    {
        let on: BTreeMap<String, String> = pairs
            .into_iter()
            .map(|(event, target)| (event.into(), target.into()))
            .collect();
        Self {
            on: (!on.is_empty()).then_some(on),
            ..Self::default()
        }
    }

    /// The transition table, or `None` when the state is terminal.
    pub fn transitions(&self) -> Option<&BTreeMap<String, String>> {
        self.on.as_ref().filter(|on| !on.is_empty())
    }

    /// Target reached by `event`, if declared.
    pub fn target(&self, event: &str) -> Option<&str> {
        self.transitions()
            .and_then(|on| on.get(event))
            .map(String::as_str)
    }

    pub fn is_terminal(&self) -> bool {
        self.transitions().is_none()
    }
}

impl fmt::Debug for StateDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDefinition")
            .field("on", &self.on)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

/// The complete, declarative description of a machine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Name of the state the machine starts in.
    pub initial: String,
    /// Every state the machine can occupy, keyed by name.
    pub states: BTreeMap<String, StateDefinition>,
}

impl MachineConfig {
    /// Parse a configuration from JSON. Hooks are never present in JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the transition table to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Look up a state's definition.
    pub fn state(&self, name: &str) -> Option<&StateDefinition> {
        self.states.get(name)
    }

    /// Attach an enter hook to `state`.
    pub fn on_enter<F>(mut self, state: &str, hook: F) -> Result<Self, ConfigError>
    where
        F: Fn() + 'static,
    {
        self.state_mut(state)?.on_enter = Some(Rc::new(hook));
        Ok(self)
    }

    /// Attach an exit hook to `state`.
    pub fn on_exit<F>(mut self, state: &str, hook: F) -> Result<Self, ConfigError>
    where
        F: Fn() + 'static,
    {
        self.state_mut(state)?.on_exit = Some(Rc::new(hook));
        Ok(self)
    }

    fn state_mut(&mut self, state: &str) -> Result<&mut StateDefinition, ConfigError> {
        self.states
            .get_mut(state)
            .ok_or_else(|| ConfigError::UnknownState {
                state: state.to_string(),
            })
    }

    /// Check the configuration, accumulating ALL violations.
    pub fn check(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = Vec::new();

        checks.push(if self.states.contains_key(&self.initial) {
            Validation::success(())
        } else {
            Validation::fail(ConfigViolation::UnknownInitial {
                initial: self.initial.clone(),
            })
        });

        for (state, definition) in &self.states {
            let Some(on) = &definition.on else {
                continue;
            };
            for (event, target) in on {
                checks.push(if self.states.contains_key(target) {
                    Validation::success(())
                } else {
                    Validation::fail(ConfigViolation::DanglingTarget {
                        state: state.clone(),
                        event: event.clone(),
                        target: target.clone(),
                    })
                });
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Validate the configuration, converting accumulated violations into
    /// a [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.check() {
            Validation::Success(_) => Ok(()),
            Validation::Failure(violations) => {
                Err(ConfigError::Invalid(violations.iter().cloned().collect()))
            }
        }
    }

    /// Structural equality of the transition tables, ignoring hooks.
    ///
    /// Absent and empty `on` tables are equivalent.
    pub fn shape_matches(&self, other: &MachineConfig) -> bool {
        self.initial == other.initial
            && self.states.len() == other.states.len()
            && self.states.iter().all(|(name, definition)| {
                other
                    .states
                    .get(name)
                    .is_some_and(|theirs| definition.transitions() == theirs.transitions())
            })
    }
}
