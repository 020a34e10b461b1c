//! Console command handlers.
//!
//! Each stdin line is either a control command (`:start`, `:stop`, ...), a raw
//! JSON capability payload, or a spoken transcript with an optional leading
//! confidence (`0.85 tìm kiếm laptop Dell`).

use chrono::Local;
use tracing::{info, warn};
use voxpos_core::{RecognitionEvent, SessionState, VoxEngine, CATALOG};

/// Confidence used when a transcript line carries none.
const TYPED_CONFIDENCE: f32 = 0.95;

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Start,
    Stop,
    Status,
    History,
    ClearHistory,
    Help,
    Quit,
    /// Raw JSON payload, decoded by the engine.
    Payload(String),
    /// Interim hypothesis (`~ tìm ki`).
    Interim(String),
    /// Final transcript with confidence.
    Say { transcript: String, confidence: f32 },
    Empty,
}

pub fn parse_line(line: &str) -> ConsoleCommand {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleCommand::Empty;
    }
    if line.starts_with('{') {
        return ConsoleCommand::Payload(line.to_string());
    }
    if let Some(rest) = line.strip_prefix('~') {
        return ConsoleCommand::Interim(rest.trim().to_string());
    }
    if let Some(control) = line.strip_prefix(':') {
        return match control.trim().to_ascii_lowercase().as_str() {
            "start" | "s" => ConsoleCommand::Start,
            "stop" => ConsoleCommand::Stop,
            "status" => ConsoleCommand::Status,
            "history" | "h" => ConsoleCommand::History,
            "clear" => ConsoleCommand::ClearHistory,
            "quit" | "q" | "exit" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Help,
        };
    }

    let (head, tail) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match head.parse::<f32>() {
        Ok(confidence) if !tail.trim().is_empty() => ConsoleCommand::Say {
            transcript: tail.trim().to_string(),
            confidence,
        },
        _ => ConsoleCommand::Say {
            transcript: line.to_string(),
            confidence: TYPED_CONFIDENCE,
        },
    }
}

/// Execute one console command. Returns `false` when the host should exit.
pub fn execute(engine: &mut VoxEngine, command: ConsoleCommand) -> bool {
    match command {
        ConsoleCommand::Empty => {}
        ConsoleCommand::Quit => return false,
        ConsoleCommand::Help => print_help(),
        ConsoleCommand::Start => {
            if let Err(e) = engine.start() {
                warn!("cannot start listening: {e}");
                println!("{e}");
            }
        }
        ConsoleCommand::Stop => engine.stop(),
        ConsoleCommand::Status => {
            let snapshot = engine.snapshot();
            match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => println!("{json}"),
                Err(e) => warn!("failed to render snapshot: {e}"),
            }
        }
        ConsoleCommand::History => print_history(engine),
        ConsoleCommand::ClearHistory => {
            engine.clear_history();
            info!("history cleared");
        }
        ConsoleCommand::Payload(payload) => {
            if let Err(e) = engine.handle_payload(&payload) {
                warn!("{e}");
            }
        }
        ConsoleCommand::Interim(transcript) => {
            ensure_listening(engine);
            if let Err(e) = engine.handle_event(RecognitionEvent::interim(transcript, 0.5)) {
                warn!("{e}");
            }
        }
        ConsoleCommand::Say {
            transcript,
            confidence,
        } => {
            ensure_listening(engine);
            if let Err(e) = engine.handle_event(RecognitionEvent::final_result(transcript, confidence))
            {
                warn!("{e}");
            }
        }
    }
    true
}

/// Typed transcripts imply the cashier pressed the mic button first.
fn ensure_listening(engine: &mut VoxEngine) {
    if engine.state() == SessionState::Idle {
        if let Err(e) = engine.start() {
            warn!("cannot start listening: {e}");
        }
    }
}

fn print_history(engine: &VoxEngine) {
    if engine.history().is_empty() {
        println!("(no commands yet)");
        return;
    }
    for result in engine.history().iter() {
        println!(
            "{}  {:>4.0}%  {:<14}  {}",
            result.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            result.confidence * 100.0,
            result.action_kind.map(|k| k.as_str()).unwrap_or("unknown"),
            result.message
        );
    }
}

fn print_help() {
    println!(":start  :stop  :status  :history  :clear  :quit");
    println!("~ <text>            interim transcript");
    println!("[confidence] <text> final transcript (default confidence {TYPED_CONFIDENCE})");
    println!("{{...}}               raw recognizer payload");
    println!("commands:");
    for intent in CATALOG {
        println!("  {:<16} {}", intent.trigger_phrase, intent.example);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_confidence_prefixed_transcript() {
        assert_eq!(
            parse_line("0.85 Tìm kiếm laptop Dell"),
            ConsoleCommand::Say {
                transcript: "Tìm kiếm laptop Dell".into(),
                confidence: 0.85,
            }
        );
    }

    #[test]
    fn bare_transcript_gets_typed_confidence() {
        assert_eq!(
            parse_line("in hóa đơn"),
            ConsoleCommand::Say {
                transcript: "in hóa đơn".into(),
                confidence: TYPED_CONFIDENCE,
            }
        );
    }

    #[test]
    fn lone_number_is_a_transcript() {
        assert_eq!(
            parse_line("15"),
            ConsoleCommand::Say {
                transcript: "15".into(),
                confidence: TYPED_CONFIDENCE,
            }
        );
    }

    #[test]
    fn control_and_payload_lines() {
        assert_eq!(parse_line(":START"), ConsoleCommand::Start);
        assert_eq!(parse_line(":q"), ConsoleCommand::Quit);
        assert_eq!(parse_line(":what"), ConsoleCommand::Help);
        assert_eq!(parse_line("   "), ConsoleCommand::Empty);
        assert_eq!(
            parse_line(r#"{"type":"end"}"#),
            ConsoleCommand::Payload(r#"{"type":"end"}"#.into())
        );
        assert_eq!(parse_line("~ tìm ki"), ConsoleCommand::Interim("tìm ki".into()));
    }
}
