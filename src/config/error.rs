//! Construction-time errors.

use thiserror::Error;

/// A single problem found while validating a [`MachineConfig`](super::MachineConfig).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("initial state '{initial}' is not a declared state")]
    UnknownInitial { initial: String },

    #[error("state '{state}' maps event '{event}' to undeclared state '{target}'")]
    DanglingTarget {
        state: String,
        event: String,
        target: String,
    },
}

/// Errors that prevent a machine from being constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Every violation found, in declaration order.
    #[error("invalid machine configuration: {}", describe(.0))]
    Invalid(Vec<ConfigViolation>),

    #[error("configuration does not match the declared shape of machine '{schema}'")]
    SchemaMismatch { schema: &'static str },

    #[error("no state named '{state}' is declared")]
    UnknownState { state: String },

    #[error("failed to parse machine configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Violations carried by an [`ConfigError::Invalid`] error, empty otherwise.
    pub fn violations(&self) -> &[ConfigViolation] {
        match self {
            Self::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
