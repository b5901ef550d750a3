//! Traffic Light State Machine
//!
//! A cyclic machine declared with `machine!`. Every `send` returns a handle
//! tagged with the next state, so the cycle below is checked by the compiler.
//!
//! Run with: cargo run --example traffic_light
//! Set `RUST_LOG=typed_fsm=trace` to see the engine's own logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use typed_fsm::config::HistoryPolicy;
use typed_fsm::{machine, MachineOptions, State};

machine! {
    /// A three-phase traffic light.
    pub mod traffic_light {
        events: [TIMER];
        initial: Green;
        states: {
            Green { TIMER => Yellow },
            Yellow { TIMER => Red },
            Red { TIMER => Green },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "typed_fsm=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let green = traffic_light::Handle::start_with(MachineOptions::with_history(
        HistoryPolicy::Unbounded,
    ))?;
    println!("Initial state: {:?}", green.current());

    let subscription = green.subscribe(|state| println!("  light is now {}", state.name()));

    // Two full cycles.
    let mut light = green.clone();
    for round in 1..=2 {
        println!("\nCycle {round}:");
        light = light
            .send(traffic_light::TIMER)?
            .send(traffic_light::TIMER)?
            .send(traffic_light::TIMER)?;
    }
    subscription.unsubscribe();

    println!("\nFinal state: {:?}", light.current());
    if let Some(history) = light.machine().history() {
        println!("Path: {}", history.get_path().join(" -> "));
        println!("Transitions recorded: {}", history.len());
    }

    // The dynamic path rejects what the typed path cannot express.
    match light.send_event("PANIC") {
        Ok(_) => println!("unexpected transition"),
        Err(err) => println!("\nRejected: {err}"),
    }

    Ok(())
}
