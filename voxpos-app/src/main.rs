//! VoxPOS console host entry point.
//!
//! ## Runtime note
//!
//! The engine is driven from the main task only. Broadcast receivers are
//! forwarded to the log on a separate task, the same way a UI shell would
//! forward them to its front end.

mod commands;
mod console;
mod handlers;
mod settings;

use console::{ConsoleRecognizer, ConsoleSynthesizer};
use settings::{default_settings_path, load_settings, save_settings};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use voxpos_core::{SpeechSynthesizer, VoxEngine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("voxpos=info")),
        )
        .init();

    info!("VoxPOS starting");

    let settings_path = default_settings_path();
    let settings = load_settings(&settings_path);
    if !settings_path.exists() {
        if let Err(e) = save_settings(&settings_path, &settings) {
            warn!("could not write default settings to {settings_path:?}: {e}");
        }
    }
    info!(path = ?settings_path, threshold = settings.confidence_threshold, "settings loaded");

    let synthesizer: Option<Box<dyn SpeechSynthesizer>> = settings
        .spoken_feedback
        .then(|| Box::new(ConsoleSynthesizer) as Box<dyn SpeechSynthesizer>);
    let mut engine = VoxEngine::new(
        settings.engine_config(),
        Some(Box::new(ConsoleRecognizer)),
        synthesizer,
    );
    handlers::register_all(&mut engine);

    spawn_event_forwarders(&engine);

    println!("VoxPOS ready. Type :help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = commands::parse_line(&line);
        if !commands::execute(&mut engine, command) {
            break;
        }
    }

    engine.stop();
    let diag = engine.diagnostics_snapshot();
    info!(
        finals = diag.finals_processed,
        matched = diag.matched,
        low_confidence = diag.low_confidence,
        no_match = diag.no_match,
        dispatched = diag.dispatched,
        handler_errors = diag.handler_errors,
        recognition_errors = diag.recognition_errors,
        "session diagnostics on exit"
    );
    Ok(())
}

fn spawn_event_forwarders(engine: &VoxEngine) {
    let mut status_rx = engine.subscribe_status();
    tokio::spawn(async move {
        loop {
            match status_rx.recv().await {
                Ok(event) => debug!(state = ?event.state, detail = ?event.detail, "session status"),
                Err(RecvError::Lagged(n)) => warn!("status forwarder lagged by {n} events"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut command_rx = engine.subscribe_commands();
    tokio::spawn(async move {
        loop {
            match command_rx.recv().await {
                Ok(result) => match serde_json::to_string(&result) {
                    Ok(json) => debug!(target: "voxpos::ui", "{json}"),
                    Err(e) => warn!("failed to serialise command result: {e}"),
                },
                Err(RecvError::Lagged(n)) => warn!("command forwarder lagged by {n} events"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
