//! Typed handles over a running machine.

use super::{AnyState, Event, Or, Schema, StateSet, Transition};
use crate::config::{ConfigError, MachineConfig, MachineOptions};
use crate::core::State;
use crate::engine::{Machine, Subscription, TransitionError};
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

/// A [`Machine`] tagged with the set of states `S` it is statically known
/// to be in.
///
/// The tag costs nothing at runtime. Every handle derived from another
/// (by `send`, `matches`, `widen`, `clone`) views the same engine, so
/// [`Handle::current`] always reports the live state no matter which
/// handle is asked.
///
/// # Example
///
/// ```rust
/// use typed_fsm::machine;
///
/// machine! {
///     pub mod form {
///         events: [SUBMIT, SUCCESS, ERROR, RETRY, RESET];
///         initial: Idle;
///         states: {
///             Idle { SUBMIT => Loading },
///             Loading { SUCCESS => Success, ERROR => Failed },
///             Failed { RETRY => Loading },
///             Success { RESET => Idle },
///         }
///     }
/// }
///
/// let idle = form::Handle::start().unwrap();
/// let loading = idle.send(form::SUBMIT).unwrap();
///
/// // Narrow a wide handle back to a specific state.
/// let any = loading.widen();
/// if let Some(loading) = any.matches::<form::Loading>() {
///     loading.send(form::SUCCESS).unwrap();
/// }
/// assert_eq!(idle.current(), form::State::Success);
/// ```
pub struct Handle<M: Schema, S> {
    machine: Machine,
    _state: PhantomData<fn() -> (M, S)>,
}

impl<M: Schema> Handle<M, M::Initial> {
    /// Start a machine from the schema's own table.
    pub fn start() -> Result<Self, ConfigError> {
        Self::create(M::config())
    }

    /// Start a machine from the schema's own table with `options`.
    pub fn start_with(options: MachineOptions) -> Result<Self, ConfigError> {
        Self::create_with(M::config(), options)
    }

    /// Start a machine from `config`, which typically is `M::config()` with
    /// hooks attached.
    pub fn create(config: MachineConfig) -> Result<Self, ConfigError> {
        Self::create_with(config, MachineOptions::default())
    }

    /// Start a machine from `config` with `options`.
    ///
    /// `config` must be valid and have exactly the schema's shape, otherwise
    /// construction fails before any hook runs.
    pub fn create_with(
        config: MachineConfig,
        options: MachineOptions,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        conform::<M>(&config)?;
        Ok(Self::tag(Machine::create_with(config, options)?))
    }
}

impl<M: Schema> Handle<M, AnyState> {
    /// View an existing untyped machine through schema `M`.
    pub fn from_machine(machine: Machine) -> Result<Self, ConfigError> {
        conform::<M>(&machine.config())?;
        Ok(Self::tag(machine))
    }
}

fn conform<M: Schema>(config: &MachineConfig) -> Result<(), ConfigError> {
    if config.shape_matches(&M::config()) {
        Ok(())
    } else {
        debug!(schema = M::name(), "configuration does not match schema");
        Err(ConfigError::SchemaMismatch { schema: M::name() })
    }
}

impl<M: Schema, S: StateSet<M>> Handle<M, S> {
    fn tag(machine: Machine) -> Self {
        Self {
            machine,
            _state: PhantomData,
        }
    }

    fn retag<T: StateSet<M>>(&self) -> Handle<M, T> {
        Handle::tag(self.machine.clone())
    }

    /// Send `event`, returning a handle tagged with the derived target.
    ///
    /// Only events declared for every state in `S` are accepted by the
    /// compiler. At runtime the live state is re-checked; if another handle
    /// has moved the engine out of `S` this fails with
    /// [`TransitionError::StaleHandle`] and nothing happens.
    pub fn send<E>(
        &self,
        _event: E,
    ) -> Result<Handle<M, <S as Transition<M, E>>::Target>, TransitionError>
    where
        E: Event,
        S: Transition<M, E>,
    {
        let current = self.current();
        if !S::contains(current) {
            debug!(state = current.name(), event = E::NAME, "stale typed handle");
            return Err(TransitionError::StaleHandle {
                event: E::NAME.to_string(),
                state: current.name().to_string(),
            });
        }
        self.machine.send(E::NAME)?;
        Ok(self.retag())
    }

    /// Send an event chosen at runtime. The result is wide; narrow it with
    /// [`Handle::matches`].
    pub fn send_event(&self, event: &str) -> Result<Handle<M, AnyState>, TransitionError> {
        self.machine.send(event)?;
        Ok(self.retag())
    }

    /// The live state.
    ///
    /// # Panics
    ///
    /// Panics if the engine holds a state outside the schema, which handle
    /// construction rules out.
    pub fn current(&self) -> M::State {
        let name = self.machine.current();
        M::State::from_name(&name).expect("engine state conforms to the schema")
    }

    /// Whether the live state is `state`.
    pub fn is(&self, state: M::State) -> bool {
        self.machine.matches(state.name())
    }

    /// Narrow to `T` if the live state is in `T`.
    pub fn matches<T: StateSet<M>>(&self) -> Option<Handle<M, T>> {
        T::contains(self.current()).then(|| self.retag())
    }

    /// Forget the static state.
    pub fn widen(self) -> Handle<M, AnyState> {
        Handle::tag(self.machine)
    }

    /// Widen to the union of `S` and `B`.
    pub fn or<B: StateSet<M>>(self) -> Handle<M, Or<S, B>> {
        Handle::tag(self.machine)
    }

    /// Register `listener` to be called with each new state.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(M::State) + 'static,
    {
        self.machine.subscribe(move |name| {
            if let Some(state) = M::State::from_name(name) {
                listener(state);
            }
        })
    }

    /// The underlying untyped machine.
    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn into_machine(self) -> Machine {
        self.machine
    }
}

impl<M: Schema, S> Clone for Handle<M, S> {
    fn clone(&self) -> Self {
        Self {
            machine: self.machine.clone(),
            _state: PhantomData,
        }
    }
}

impl<M: Schema, S> fmt::Debug for Handle<M, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("schema", &M::name())
            .field("tag", &std::any::type_name::<S>())
            .field("machine", &self.machine)
            .finish()
    }
}
