//! Typestate layer: compile-time transition checking.
//!
//! The traits here turn a machine's transition table into type-level
//! facts. None of them have runtime representation: marker types are
//! uninhabited, and a [`Handle`] is a `Machine` plus `PhantomData`.
//!
//! | Fact                     | Encoding                                        |
//! |--------------------------|-------------------------------------------------|
//! | state universe           | [`Schema::State`]                               |
//! | initial state            | [`Schema::Initial`]                             |
//! | events legal from `S`    | every `E` with `S: Transition<M, E>`            |
//! | target of `E` from `S`   | [`TargetOf<M, S, E>`]                           |
//! | union of states          | [`Or<A, B>`], [`AnyState`]                      |
//!
//! Implementations are normally generated by [`machine!`](crate::machine).
//!
//! # Rejected before running
//!
//! Sending an event the current state does not declare is a type error:
//!
//! ```compile_fail
//! typed_fsm::machine! {
//!     pub mod job {
//!         events: [START, FINISH];
//!         initial: Queued;
//!         states: {
//!             Queued { START => Running },
//!             Running { FINISH => Done },
//!             Done {},
//!         }
//!     }
//! }
//!
//! let queued = job::Handle::start().unwrap();
//! queued.send(job::FINISH);
//! ```
//!
//! A terminal state has no events at all, so `send` cannot be called:
//!
//! ```compile_fail
//! typed_fsm::machine! {
//!     pub mod job {
//!         events: [START, FINISH];
//!         initial: Queued;
//!         states: {
//!             Queued { START => Running },
//!             Running { FINISH => Done },
//!             Done {},
//!         }
//!     }
//! }
//!
//! let done = job::Handle::start()
//!     .unwrap()
//!     .send(job::START)
//!     .unwrap()
//!     .send(job::FINISH)
//!     .unwrap();
//! done.send(job::START);
//! ```
//!
//! The same chain without the last step compiles and runs:
//!
//! ```rust
//! typed_fsm::machine! {
//!     pub mod job {
//!         events: [START, FINISH];
//!         initial: Queued;
//!         states: {
//!             Queued { START => Running },
//!             Running { FINISH => Done },
//!             Done {},
//!         }
//!     }
//! }
//!
//! let done = job::Handle::start()
//!     .unwrap()
//!     .send(job::START)
//!     .unwrap()
//!     .send(job::FINISH)
//!     .unwrap();
//! assert_eq!(done.current(), job::State::Done);
//! ```

mod handle;

pub use handle::Handle;

use crate::config::MachineConfig;
use crate::core::State;
use std::marker::PhantomData;

/// A machine's type-level description.
pub trait Schema: Sized + 'static {
    /// The state universe.
    type State: State;

    /// The declared initial state.
    type Initial: StateType<Self>;

    /// The declared transition table as data, without hooks.
    fn config() -> MachineConfig;

    /// Name used in diagnostics.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A type denoting a set of states of machine `M`.
pub trait StateSet<M: Schema>: 'static {
    /// Whether `state` is a member of this set.
    fn contains(state: M::State) -> bool;
}

/// A type denoting exactly one state of machine `M`.
pub trait StateType<M: Schema>: StateSet<M> {
    const STATE: M::State;
}

/// A type-level event.
pub trait Event: 'static {
    const NAME: &'static str;
}

/// Implemented for `(S, E)` exactly when `S` declares event `E`.
///
/// States with no outgoing transitions implement this for no event, so a
/// [`Handle`] tagged with them exposes no callable `send`.
pub trait Transition<M: Schema, E: Event>: StateSet<M> {
    /// The state set reached by sending `E` from `Self`.
    type Target: StateSet<M>;
}

/// The state set reached by sending `E` from `S`.
pub type TargetOf<M, S, E> = <S as Transition<M, E>>::Target;

/// Union of two state sets.
///
/// An event is legal from `Or<A, B>` only when both sides declare it, and
/// the result is the union of each side's own target.
pub struct Or<A, B>(PhantomData<fn() -> (A, B)>);

impl<M, A, B> StateSet<M> for Or<A, B>
where
    M: Schema,
    A: StateSet<M>,
    B: StateSet<M>,
{
    fn contains(state: M::State) -> bool {
        A::contains(state) || B::contains(state)
    }
}

impl<M, E, A, B> Transition<M, E> for Or<A, B>
where
    M: Schema,
    E: Event,
    A: Transition<M, E>,
    B: Transition<M, E>,
{
    type Target = Or<A::Target, B::Target>;
}

/// Every state of the machine. Has no transitions; narrow it with
/// [`Handle::matches`] first.
pub enum AnyState {}

impl<M: Schema> StateSet<M> for AnyState {
    fn contains(_state: M::State) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::machine! {
        mod light {
            events: [TIMER, FAULT];
            initial: Green;
            states: {
                Green { TIMER => Yellow, FAULT => Off },
                Yellow { TIMER => Red, FAULT => Off },
                Red { TIMER => Green },
                Off {},
            }
        }
    }

    fn same_type<T: 'static, U: 'static>() -> bool {
        std::any::TypeId::of::<T>() == std::any::TypeId::of::<U>()
    }

    #[test]
    fn target_of_follows_declared_table() {
        assert!(same_type::<TargetOf<light::Machine, light::Green, light::TIMER>, light::Yellow>());
        assert!(same_type::<TargetOf<light::Machine, light::Red, light::TIMER>, light::Green>());
        assert!(same_type::<TargetOf<light::Machine, light::Yellow, light::FAULT>, light::Off>());
    }

    #[test]
    fn union_target_is_per_branch_union() {
        type Amber = Or<light::Green, light::Yellow>;
        assert!(same_type::<
            TargetOf<light::Machine, Amber, light::TIMER>,
            Or<light::Yellow, light::Red>,
        >());
        assert!(same_type::<
            TargetOf<light::Machine, Amber, light::FAULT>,
            Or<light::Off, light::Off>,
        >());
    }

    #[test]
    fn set_membership() {
        use light::State;
        assert!(<light::Green as StateSet<light::Machine>>::contains(State::Green));
        assert!(!<light::Green as StateSet<light::Machine>>::contains(State::Red));
        assert!(<Or<light::Red, light::Off> as StateSet<light::Machine>>::contains(State::Off));
        assert!(!<Or<light::Red, light::Off> as StateSet<light::Machine>>::contains(State::Yellow));
        for state in <State as crate::core::State>::all() {
            assert!(<AnyState as StateSet<light::Machine>>::contains(*state));
        }
    }

    #[test]
    fn initial_and_universe_come_from_schema() {
        use crate::core::State as _;
        assert_eq!(<light::Initial as StateType<light::Machine>>::STATE, light::State::Green);
        assert_eq!(light::State::all().len(), 4);
        assert!(light::State::Off.is_final());
        assert!(!light::State::Red.is_final());
    }

    #[test]
    fn markers_are_zero_sized() {
        assert_eq!(std::mem::size_of::<light::TIMER>(), 0);
        assert_eq!(std::mem::size_of::<PhantomData<Or<light::Green, light::Red>>>(), 0);
    }
}
