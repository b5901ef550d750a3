//! Form Submission Flow
//!
//! Shows both views of one machine:
//! - a JSON transition table driven through the untyped [`Machine`]
//! - the same table declared with `machine!`, with enter/exit hooks and a
//!   subscriber, driven through typed handles
//!
//! Run with: cargo run --example form_flow

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use typed_fsm::config::HistoryPolicy;
use typed_fsm::{machine, Machine, MachineConfig, MachineOptions, Snapshot};

machine! {
    /// A form that submits, may fail, and can be retried.
    pub mod form {
        events: [SUBMIT, SUCCESS, ERROR, RETRY, RESET];
        initial: Idle;
        states: {
            Idle { SUBMIT => Loading },
            Loading { SUCCESS => Success, ERROR => Failed },
            Failed { RETRY => Loading },
            Success { RESET => Idle },
        }
    }
}

const FORM_JSON: &str = r#"{
    "initial": "Idle",
    "states": {
        "Idle": { "on": { "SUBMIT": "Loading" } },
        "Loading": { "on": { "SUCCESS": "Success", "ERROR": "Failed" } },
        "Failed": { "on": { "RETRY": "Loading" } },
        "Success": { "on": { "RESET": "Idle" } }
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "typed_fsm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Form Submission Flow ===\n");

    println!("--- Untyped engine from JSON ---");
    let config = MachineConfig::from_json(FORM_JSON)?;
    let options = MachineOptions::with_history(HistoryPolicy::Unbounded);
    let machine = Machine::create_with(config, options)?;
    println!("Start: {} (accepts {:?})", machine.current(), machine.events());
    for event in ["SUBMIT", "SUCCESS", "SUBMIT", "RESET"] {
        match machine.send(event) {
            Ok(to) => println!("  {event:>7} -> {to}"),
            Err(err) => println!("  {event:>7} rejected: {err}"),
        }
    }

    let snapshot = machine.snapshot();
    let json = snapshot.to_json()?;
    let restored = Snapshot::from_json(&json)?;
    println!("Snapshot current: {}", restored.current);
    println!("Snapshot path: {}", restored.history.get_path().join(" -> "));

    // The JSON table has the same shape as the declared one.
    let typed = form::Handle::from_machine(machine)?;
    println!("Typed view of JSON machine: {:?}", typed.current());

    println!("\n--- Typed handles with hooks ---");
    let config = form::config()
        .on_enter("Loading", || println!("  [hook] spinner on"))?
        .on_exit("Loading", || println!("  [hook] spinner off"))?
        .on_enter("Failed", || println!("  [hook] show error banner"))?
        .on_enter("Success", || println!("  [hook] show confirmation"))?;

    let idle = form::Handle::create(config)?;
    let subscription = idle.subscribe(|state| println!("  [subscriber] now {state:?}"));

    let failed = idle.send(form::SUBMIT)?.send(form::ERROR)?;
    println!("After first attempt: {:?}", failed.current());

    let success = failed.send(form::RETRY)?.send(form::SUCCESS)?;
    println!("After retry: {:?}", success.current());

    subscription.unsubscribe();
    let idle_again = success.send(form::RESET)?;
    println!("Reset quietly to {:?}", idle_again.current());

    // A stale handle is refused at runtime.
    match failed.send(form::RETRY) {
        Ok(_) => println!("unexpected transition"),
        Err(err) => println!("Stale handle: {err}"),
    }

    Ok(())
}
