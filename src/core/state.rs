//! Core State trait for machine state identifiers.
//!
//! Every machine generated by [`machine!`](crate::machine) gets a plain
//! enum implementing this trait. It is the runtime face of the state
//! universe: one variant per declared state, nothing else.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for the closed set of states a machine can occupy.
///
/// All methods are pure. Implementations are normally generated by the
/// [`machine!`](crate::machine) macro, but a hand-written enum works too.
///
/// # Example
///
/// ```rust
/// use typed_fsm::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &'static str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
///
///     fn all() -> &'static [Self] {
///         &[Self::Open, Self::Closed]
///     }
/// }
///
/// assert_eq!(Door::from_name("Closed"), Some(Door::Closed));
/// assert_eq!(Door::from_name("Ajar"), None);
/// ```
pub trait State:
    Copy + Eq + Hash + Debug + Serialize + DeserializeOwned + 'static
{
    /// The state's name as declared in the machine configuration.
    fn name(&self) -> &'static str;

    /// Every state of the machine, in declaration order.
    fn all() -> &'static [Self];

    /// Look up a state by its declared name.
    ///
    /// Default implementation scans [`State::all`].
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.name() == name)
    }

    /// Check if this is a terminal state (no outgoing transitions).
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
