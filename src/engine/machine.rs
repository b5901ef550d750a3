//! Runtime engine that executes transitions.

use super::error::TransitionError;
use super::subscription::{Listener, Subscription};
use crate::config::{ConfigError, MachineConfig, MachineOptions, StateDefinition};
use crate::core::{StateHistory, StateTransition};
use crate::snapshot::{Snapshot, SNAPSHOT_VERSION};
use chrono::Utc;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// Mutable engine record shared by every handle.
pub(crate) struct Engine {
    id: Uuid,
    config: MachineConfig,
    current: String,
    listeners: Vec<(u64, Listener)>,
    next_listener: u64,
    history: Option<StateHistory>,
    sending: bool,
}

impl Engine {
    pub(super) fn remove_listener(&mut self, id: u64) {
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
    }

    pub(super) fn has_listener(&self, id: u64) -> bool {
        self.listeners.iter().any(|(listener_id, _)| *listener_id == id)
    }
}

/// Clears the in-progress flag even if a hook or listener panics.
struct Sending<'a>(&'a RefCell<Engine>);

impl Drop for Sending<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().sending = false;
    }
}

/// A running state machine.
///
/// `Machine` is a thin reference to one engine record: cloning it yields
/// another view of the same engine, so a transition made through any clone
/// is visible through all of them. It is single-threaded by construction.
///
/// # Example
///
/// ```rust
/// use typed_fsm::config::{MachineConfig, StateDefinition};
/// use typed_fsm::engine::Machine;
/// use std::collections::BTreeMap;
///
/// let config = MachineConfig {
///     initial: "green".to_string(),
///     states: BTreeMap::from([
///         ("green".to_string(), StateDefinition::from_pairs([("TIMER", "yellow")])),
///         ("yellow".to_string(), StateDefinition::from_pairs([("TIMER", "red")])),
///         ("red".to_string(), StateDefinition::from_pairs([("TIMER", "green")])),
///     ]),
/// };
///
/// let machine = Machine::create(config).unwrap();
/// let alias = machine.clone();
///
/// assert_eq!(machine.send("TIMER").unwrap(), "yellow");
/// assert_eq!(alias.current(), "yellow");
/// assert!(machine.send("HONK").is_err());
/// ```
#[derive(Clone)]
pub struct Machine {
    engine: Rc<RefCell<Engine>>,
}

impl Machine {
    /// Validate `config` and start a machine with default options.
    pub fn create(config: MachineConfig) -> Result<Self, ConfigError> {
        Self::create_with(config, MachineOptions::default())
    }

    /// Validate `config` and start a machine in its initial state.
    ///
    /// The initial state's enter hook runs exactly once before this
    /// returns. A configuration with any dangling target is rejected before
    /// any hook runs.
    pub fn create_with(
        config: MachineConfig,
        options: MachineOptions,
    ) -> Result<Self, ConfigError> {
        if let Err(err) = config.validate() {
            warn!(error = %err, "rejected machine configuration");
            return Err(err);
        }

        let id = Uuid::new_v4();
        let current = config.initial.clone();
        let on_enter = config
            .state(&current)
            .and_then(|definition| definition.on_enter.clone());

        let machine = Self {
            engine: Rc::new(RefCell::new(Engine {
                id,
                config,
                current,
                listeners: Vec::new(),
                next_listener: 0,
                history: options.history.history(),
                sending: false,
            })),
        };

        if let Some(hook) = on_enter {
            trace!(machine = %id, "running initial enter hook");
            hook();
        }

        debug!(machine = %id, initial = %machine.current(), "machine created");
        Ok(machine)
    }

    /// Send `event` from the live state.
    ///
    /// On success runs, in order: the old state's exit hook, the state
    /// change, the new state's enter hook, then every listener registered
    /// when notification began. Returns the new state's name.
    pub fn send(&self, event: &str) -> Result<String, TransitionError> {
        let (id, from, to, on_exit, on_enter) = {
            let mut engine = self.engine.borrow_mut();
            let from = engine.current.clone();

            if engine.sending {
                warn!(machine = %engine.id, state = %from, event, "re-entrant send rejected");
                return Err(TransitionError::Reentrant {
                    event: event.to_string(),
                    state: from,
                });
            }

            let Some(on) = engine
                .config
                .state(&from)
                .and_then(StateDefinition::transitions)
            else {
                debug!(machine = %engine.id, state = %from, event, "send from terminal state");
                return Err(TransitionError::NoTransitions { state: from });
            };
            let Some(to) = on.get(event).cloned() else {
                debug!(machine = %engine.id, state = %from, event, "unmapped event");
                return Err(TransitionError::UnmappedEvent {
                    event: event.to_string(),
                    state: from,
                });
            };

            let on_exit = engine
                .config
                .state(&from)
                .and_then(|definition| definition.on_exit.clone());
            let on_enter = engine
                .config
                .state(&to)
                .and_then(|definition| definition.on_enter.clone());

            engine.sending = true;
            (engine.id, from, to, on_exit, on_enter)
        };
        let _sending = Sending(&*self.engine);

        if let Some(hook) = on_exit {
            trace!(machine = %id, state = %from, "running exit hook");
            hook();
        }

        {
            let mut engine = self.engine.borrow_mut();
            engine.current = to.clone();
            if let Some(history) = engine.history.as_mut() {
                history.record(StateTransition {
                    from: from.clone(),
                    event: event.to_string(),
                    to: to.clone(),
                    timestamp: Utc::now(),
                });
            }
        }

        if let Some(hook) = on_enter {
            trace!(machine = %id, state = %to, "running enter hook");
            hook();
        }

        let listeners: Vec<Listener> = self
            .engine
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        trace!(machine = %id, count = listeners.len(), "notifying listeners");
        for listener in listeners {
            listener(&to);
        }

        debug!(machine = %id, from = %from, event, to = %to, "transition");
        Ok(to)
    }

    /// Name of the live state.
    pub fn current(&self) -> String {
        self.engine.borrow().current.clone()
    }

    /// Whether the live state is `state`. Pure; no side effects.
    pub fn matches(&self, state: &str) -> bool {
        self.engine.borrow().current == state
    }

    /// Events accepted from the live state, in name order.
    pub fn events(&self) -> Vec<String> {
        let engine = self.engine.borrow();
        engine
            .config
            .state(&engine.current)
            .and_then(StateDefinition::transitions)
            .map(|on| on.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the live state has no outgoing transitions.
    pub fn is_final(&self) -> bool {
        self.events().is_empty()
    }

    /// Register `listener` to be called with the new state name after every
    /// successful transition. Listeners are called in registration order.
    ///
    /// A listener registered after construction never observes the initial
    /// state; only transitions are notified.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&str) + 'static,
    {
        let mut engine = self.engine.borrow_mut();
        let id = engine.next_listener;
        engine.next_listener += 1;
        engine.listeners.push((id, Rc::new(listener)));
        trace!(machine = %engine.id, listener = id, "listener registered");
        Subscription::new(id, Rc::downgrade(&self.engine))
    }

    pub fn listener_count(&self) -> usize {
        self.engine.borrow().listeners.len()
    }

    /// Recorded transitions, or `None` when history is off.
    pub fn history(&self) -> Option<StateHistory> {
        self.engine.borrow().history.clone()
    }

    /// Unique identifier of this engine.
    pub fn id(&self) -> Uuid {
        self.engine.borrow().id
    }

    /// The configuration this engine was built from.
    pub fn config(&self) -> MachineConfig {
        self.engine.borrow().config.clone()
    }

    /// Whether `self` and `other` view the same engine.
    pub fn same_engine(&self, other: &Machine) -> bool {
        Rc::ptr_eq(&self.engine, &other.engine)
    }

    /// Capture the live state and history as a serializable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        let engine = self.engine.borrow();
        Snapshot {
            version: SNAPSHOT_VERSION,
            machine_id: engine.id,
            taken_at: Utc::now(),
            initial: engine.config.initial.clone(),
            current: engine.current.clone(),
            history: engine.history.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Debug for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.engine.try_borrow() {
            Ok(engine) => f
                .debug_struct("Machine")
                .field("id", &engine.id)
                .field("current", &engine.current)
                .field("listeners", &engine.listeners.len())
                .finish(),
            Err(_) => f.debug_struct("Machine").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HistoryPolicy;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    type Log = Rc<RefCell<Vec<String>>>;

    fn form_flow() -> MachineConfig {
        MachineConfig {
            initial: "idle".to_string(),
            states: BTreeMap::from([
                ("idle".to_string(), StateDefinition::from_pairs([("SUBMIT", "loading")])),
                (
                    "loading".to_string(),
                    StateDefinition::from_pairs([("SUCCESS", "success"), ("ERROR", "error")]),
                ),
                ("error".to_string(), StateDefinition::from_pairs([("RETRY", "loading")])),
                ("success".to_string(), StateDefinition::from_pairs([("RESET", "idle")])),
            ]),
        }
    }

    fn logged(config: MachineConfig, log: &Log) -> MachineConfig {
        let names: Vec<String> = config.states.keys().cloned().collect();
        names.into_iter().fold(config, |config, name| {
            let enter_log = Rc::clone(log);
            let exit_log = Rc::clone(log);
            let enter_name = name.clone();
            let exit_name = name.clone();
            config
                .on_enter(&name, move || enter_log.borrow_mut().push(format!("enter:{enter_name}")))
                .unwrap()
                .on_exit(&name, move || exit_log.borrow_mut().push(format!("exit:{exit_name}")))
                .unwrap()
        })
    }

    #[test]
    fn create_runs_initial_enter_hook_once() {
        let log: Log = Rc::default();
        let machine = Machine::create(logged(form_flow(), &log)).unwrap();

        assert_eq!(machine.current(), "idle");
        assert_eq!(*log.borrow(), vec!["enter:idle"]);
    }

    #[test]
    fn dangling_target_fails_before_any_hook() {
        let log: Log = Rc::default();
        let mut config = logged(form_flow(), &log);
        config.states.insert(
            "success".to_string(),
            StateDefinition::from_pairs([("RESET", "nowhere")]),
        );

        let err = Machine::create(config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn send_orders_exit_enter_then_listeners() {
        let log: Log = Rc::default();
        let machine = Machine::create(logged(form_flow(), &log)).unwrap();
        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            let _ = machine.subscribe(move |state| log.borrow_mut().push(format!("{tag}:{state}")));
        }
        log.borrow_mut().clear();

        machine.send("SUBMIT").unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["exit:idle", "enter:loading", "first:loading", "second:loading"]
        );
    }

    #[test]
    fn exit_hook_observes_old_state_and_enter_hook_new_state() {
        let seen: Log = Rc::default();
        let machine_slot: Rc<RefCell<Option<Machine>>> = Rc::default();

        let exit_seen = Rc::clone(&seen);
        let exit_slot = Rc::clone(&machine_slot);
        let enter_seen = Rc::clone(&seen);
        let enter_slot = Rc::clone(&machine_slot);
        let config = form_flow()
            .on_exit("idle", move || {
                if let Some(m) = exit_slot.borrow().as_ref() {
                    exit_seen.borrow_mut().push(m.current());
                }
            })
            .unwrap()
            .on_enter("loading", move || {
                if let Some(m) = enter_slot.borrow().as_ref() {
                    enter_seen.borrow_mut().push(m.current());
                }
            })
            .unwrap();

        let machine = Machine::create(config).unwrap();
        *machine_slot.borrow_mut() = Some(machine.clone());
        machine.send("SUBMIT").unwrap();

        assert_eq!(*seen.borrow(), vec!["idle", "loading"]);
    }

    #[test]
    fn terminal_state_rejects_every_event() {
        let config = MachineConfig {
            initial: "done".to_string(),
            states: BTreeMap::from([("done".to_string(), StateDefinition::terminal())]),
        };
        let machine = Machine::create(config).unwrap();

        let err = machine.send("ANYTHING").unwrap_err();
        assert_eq!(
            err,
            TransitionError::NoTransitions {
                state: "done".to_string()
            }
        );
        assert!(machine.is_final());
    }

    #[test]
    fn failed_send_changes_nothing() {
        let log: Log = Rc::default();
        let machine = Machine::create(logged(form_flow(), &log)).unwrap();
        let listener_log = Rc::clone(&log);
        let _sub = machine.subscribe(move |s| listener_log.borrow_mut().push(s.to_string()));
        log.borrow_mut().clear();

        let err = machine.send("RESET").unwrap_err();

        assert!(matches!(err, TransitionError::UnmappedEvent { .. }));
        assert_eq!(machine.current(), "idle");
        assert!(log.borrow().is_empty());
        assert_eq!(machine.listener_count(), 1);
    }

    #[test]
    fn clones_alias_one_engine() {
        let machine = Machine::create(form_flow()).unwrap();
        let alias = machine.clone();

        alias.send("SUBMIT").unwrap();

        assert_eq!(machine.current(), "loading");
        assert!(machine.matches("loading"));
        assert!(!machine.matches("idle"));
        assert!(machine.same_engine(&alias));
        assert_eq!(machine.id(), alias.id());
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let machine = Machine::create(form_flow()).unwrap();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let sub = machine.subscribe(move |_| counter.set(counter.get() + 1));
        let other = machine.subscribe(|_| {});

        machine.send("SUBMIT").unwrap();
        sub.unsubscribe();
        sub.unsubscribe();
        machine.send("ERROR").unwrap();

        assert_eq!(count.get(), 1);
        assert!(!sub.is_active());
        assert!(other.is_active());
        assert_eq!(machine.listener_count(), 1);
    }

    #[test]
    fn listener_added_mid_round_waits_for_next_round() {
        let machine = Machine::create(form_flow()).unwrap();
        let late_calls = Rc::new(Cell::new(0));

        let registrar = machine.clone();
        let late = Rc::clone(&late_calls);
        let added = Rc::new(Cell::new(false));
        let _sub = machine.subscribe(move |_| {
            if !added.replace(true) {
                let late = Rc::clone(&late);
                let _ = registrar.subscribe(move |_| late.set(late.get() + 1));
            }
        });

        machine.send("SUBMIT").unwrap();
        assert_eq!(late_calls.get(), 0);

        machine.send("ERROR").unwrap();
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn listener_removed_mid_round_still_runs_that_round() {
        let machine = Machine::create(form_flow()).unwrap();
        let second_calls = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::default();

        let remover_slot = Rc::clone(&slot);
        let _first = machine.subscribe(move |_| {
            if let Some(sub) = remover_slot.borrow().as_ref() {
                sub.unsubscribe();
            }
        });
        let counter = Rc::clone(&second_calls);
        *slot.borrow_mut() = Some(machine.subscribe(move |_| counter.set(counter.get() + 1)));

        machine.send("SUBMIT").unwrap();
        machine.send("ERROR").unwrap();

        assert_eq!(second_calls.get(), 1);
    }

    #[test]
    fn reentrant_send_from_listener_is_rejected() {
        let machine = Machine::create(form_flow()).unwrap();
        let outcome: Rc<RefCell<Option<Result<String, TransitionError>>>> = Rc::default();

        let inner = machine.clone();
        let slot = Rc::clone(&outcome);
        let _sub = machine.subscribe(move |state| {
            if state == "loading" {
                *slot.borrow_mut() = Some(inner.send("SUCCESS"));
            }
        });

        machine.send("SUBMIT").unwrap();

        assert_eq!(
            outcome.borrow().clone(),
            Some(Err(TransitionError::Reentrant {
                event: "SUCCESS".to_string(),
                state: "loading".to_string(),
            }))
        );
        assert_eq!(machine.current(), "loading");
        assert_eq!(machine.send("SUCCESS").unwrap(), "success");
    }

    #[test]
    fn history_is_recorded_when_enabled() {
        let machine = Machine::create_with(
            form_flow(),
            MachineOptions::with_history(HistoryPolicy::Unbounded),
        )
        .unwrap();

        for event in ["SUBMIT", "ERROR", "RETRY", "SUCCESS", "RESET"] {
            machine.send(event).unwrap();
        }

        let history = machine.history().unwrap();
        assert_eq!(
            history.get_path(),
            vec!["idle", "loading", "error", "loading", "success", "idle"]
        );
        assert_eq!(history.latest().unwrap().event, "RESET");
    }

    #[test]
    fn maximal_history_bound_from_json_starts_and_records() {
        let options: MachineOptions =
            serde_json::from_str(r#"{"history":{"bounded":18446744073709551615}}"#).unwrap();
        assert_eq!(options.history, HistoryPolicy::Bounded(usize::MAX));

        let machine = Machine::create_with(form_flow(), options).unwrap();
        machine.send("SUBMIT").unwrap();

        let history = machine.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.get_path(), vec!["idle", "loading"]);
    }

    #[test]
    fn history_is_absent_by_default() {
        let machine = Machine::create(form_flow()).unwrap();
        machine.send("SUBMIT").unwrap();
        assert!(machine.history().is_none());
    }

    #[test]
    fn events_lists_live_state_transitions() {
        let machine = Machine::create(form_flow()).unwrap();
        machine.send("SUBMIT").unwrap();
        assert_eq!(machine.events(), vec!["ERROR", "SUCCESS"]);
    }

    #[test]
    fn unsubscribe_after_engine_dropped_is_noop() {
        let machine = Machine::create(form_flow()).unwrap();
        let sub = machine.subscribe(|_| {});
        drop(machine);

        sub.unsubscribe();
        assert!(!sub.is_active());
    }
}
