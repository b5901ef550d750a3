//! Macro for declaring a typed machine from one transition table.

/// Declare a machine: its events, initial state, and transition table.
///
/// Expands to a module containing:
/// - `State`: an enum with one variant per state, implementing
///   [`core::State`](crate::core::State)
/// - one uninhabited marker type per state and a unit struct per event
/// - a [`Transition`](crate::typed::Transition) impl per table row
/// - `Machine`, the [`Schema`](crate::typed::Schema) tying it together
/// - `Handle<S = Initial>`, `Initial`, and `config()`
///
/// A target that is not a declared state, or a repeated (state, event)
/// row, fails to compile. `State`, `Machine`, `Handle`, `Initial` and
/// `config` are reserved and cannot be used as state or event names.
///
/// State markers and event structs live in the same type namespace of the
/// generated module, so no event may share its name with a state. A clash
/// surfaces as a "defined multiple times" error:
///
/// ```compile_fail
/// typed_fsm::machine! {
///     pub mod clash {
///         events: [Done];
///         initial: Working;
///         states: {
///             Working { Done => Done },
///             Done {},
///         }
///     }
/// }
/// ```
///
/// # Example
///
/// ```
/// use typed_fsm::machine;
///
/// machine! {
///     /// A three-phase traffic light.
///     pub mod traffic_light {
///         events: [TIMER];
///         initial: Green;
///         states: {
///             Green { TIMER => Yellow },
///             Yellow { TIMER => Red },
///             Red { TIMER => Green },
///         }
///     }
/// }
///
/// let green = traffic_light::Handle::start().unwrap();
/// let back = green
///     .send(traffic_light::TIMER).unwrap()
///     .send(traffic_light::TIMER).unwrap()
///     .send(traffic_light::TIMER).unwrap();
/// assert_eq!(back.current(), traffic_light::State::Green);
/// ```
///
/// Targets must be declared states:
///
/// ```compile_fail
/// typed_fsm::machine! {
///     pub mod broken {
///         events: [GO];
///         initial: A;
///         states: {
///             A { GO => Nonexistent },
///         }
///     }
/// }
/// ```
#[macro_export]
macro_rules! machine {
    (@terminal) => {
        true
    };
    (@terminal $($event:ident)+) => {
        false
    };
    (@transitions $state:ident { $($event:ident => $target:ident),* }) => {
        $(
            impl $crate::typed::Transition<Machine, $event> for $state {
                type Target = $target;
            }
        )*
    };
    (
        $(#[$meta:meta])*
        $vis:vis mod $name:ident {
            events: [$($event:ident),* $(,)?];
            initial: $initial:ident;
            states: {
                $(
                    $(#[$state_meta:meta])*
                    $state:ident { $($on:ident => $target:ident),* $(,)? }
                ),+ $(,)?
            }
        }
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types, dead_code)]
        $vis mod $name {
            /// Every state of this machine.
            #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
            pub enum State {
                $(
                    $(#[$state_meta])*
                    $state
                ),+
            }

            impl $crate::core::State for State {
                fn name(&self) -> &'static str {
                    match self {
                        $(Self::$state => stringify!($state)),+
                    }
                }

                fn all() -> &'static [Self] {
                    &[$(Self::$state),+]
                }

                fn is_final(&self) -> bool {
                    match self {
                        $(Self::$state => $crate::machine!(@terminal $($on)*)),+
                    }
                }
            }

            $(
                #[doc = concat!("Type-level marker for the `", stringify!($state), "` state.")]
                pub enum $state {}

                impl $crate::typed::StateSet<Machine> for $state {
                    fn contains(state: State) -> bool {
                        matches!(state, State::$state)
                    }
                }

                impl $crate::typed::StateType<Machine> for $state {
                    const STATE: State = State::$state;
                }
            )+

            $(
                #[doc = concat!("The `", stringify!($event), "` event.")]
                #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
                pub struct $event;

                impl $crate::typed::Event for $event {
                    const NAME: &'static str = stringify!($event);
                }
            )*

            $(
                $crate::machine!(@transitions $state { $($on => $target),* });
            )+

            /// Schema of this machine.
            pub enum Machine {}

            impl $crate::typed::Schema for Machine {
                type State = State;
                type Initial = $initial;

                fn config() -> $crate::config::MachineConfig {
                    config()
                }

                fn name() -> &'static str {
                    stringify!($name)
                }
            }

            /// The declared initial state.
            pub type Initial = $initial;

            /// A handle to a running instance, tagged with state `S`.
            pub type Handle<S = $initial> = $crate::typed::Handle<Machine, S>;

            /// The declared transition table as data, without hooks.
            pub fn config() -> $crate::config::MachineConfig {
                let mut states = ::std::collections::BTreeMap::new();
                $(
                    let pairs: ::std::vec::Vec<(&str, &str)> =
                        ::std::vec![$((stringify!($on), stringify!($target))),*];
                    states.insert(
                        ::std::string::String::from(stringify!($state)),
                        $crate::config::StateDefinition::from_pairs(pairs),
                    );
                )+
                $crate::config::MachineConfig {
                    initial: ::std::string::String::from(stringify!($initial)),
                    states,
                }
            }
        }
    };
}
