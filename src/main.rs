/*!
 * Signal Router - Demo Entry Point
 *
 * Runs one complete producer/consumer exchange:
 * - A consumer thread waits for a door-confirmation signal and answers it
 * - The producer triggers the signal and awaits the typed result
 */

use anyhow::Context;
use state_signals::monitoring::span_signal;
use state_signals::{
    init_tracing, ParameterDescriptor, ParameterType, SignalHandler, SignalRouter, SignalTrigger,
    WaitConfig,
};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

const INSTANCE: &str = "printer1";
const SIGNAL: &str = "confirmDoor";

fn run_consumer(router: SignalRouter) -> anyhow::Result<()> {
    loop {
        let Some(mut handler) = SignalHandler::next(&router, INSTANCE, SIGNAL)? else {
            thread::sleep(Duration::from_millis(5));
            continue;
        };

        let _span = span_signal(INSTANCE, SIGNAL, handler.uuid()).entered();
        if !handler.mark_in_process()? {
            continue;
        }
        let door = handler.get_integer("door")?;
        info!(uuid = handler.uuid(), door, "Consumer confirming door");

        handler.set_bool_result("confirmed", true)?;
        handler.set_string_result("operator", "demo")?;
        handler.signal_handled()?;
        return Ok(());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Signal router demo starting...");
    let router = SignalRouter::new();
    router.register_definition(
        INSTANCE,
        SIGNAL,
        vec![ParameterDescriptor::new("door", ParameterType::Integer)],
        vec![
            ParameterDescriptor::new("confirmed", ParameterType::Bool),
            ParameterDescriptor::new("operator", ParameterType::String),
        ],
        1000,
        2,
    )?;

    let consumer_router = router.clone();
    let consumer = thread::Builder::new()
        .name("signal-consumer".into())
        .spawn(move || run_consumer(consumer_router))
        .context("failed to spawn consumer thread")?;

    let mut trigger =
        SignalTrigger::new(&router, INSTANCE, SIGNAL)?.with_config(WaitConfig::from_env());
    trigger.set_integer("door", 1)?;
    trigger.trigger()?;
    info!(uuid = trigger.uuid(), "Signal triggered");

    let timeout_ms = trigger.reaction_timeout()?;
    if trigger.wait_for_handling_async(timeout_ms).await? {
        info!(
            phase = %trigger.phase()?,
            confirmed = trigger.get_bool_result("confirmed")?,
            operator = %trigger.get_string_result("operator")?,
            "Signal answered"
        );
    } else {
        warn!(timeout_ms, "Signal was not handled in time");
    }
    trigger.finalize();

    match consumer.join() {
        Ok(result) => result?,
        Err(_) => anyhow::bail!("consumer thread panicked"),
    }

    let stats = router.stats();
    info!(
        enqueued = stats.total_enqueued,
        handled = stats.total_handled,
        live = stats.live_signals,
        "Signal router demo finished"
    );
    Ok(())
}
