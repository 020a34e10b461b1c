//! # voxpos-core
//!
//! Voice-command engine for a point-of-sale front end.
//!
//! ## Architecture
//!
//! ```text
//! host speech capability ──► RecognitionEvent::decode ──► VoxEngine::handle_event
//!                                                             │ (Final only)
//!                                                     IntentMatcher::classify
//!                                                             │
//!                                                       extract::extract
//!                                                             │
//!                                      Dispatcher ◄── CommandResult ──► FeedbackSynthesizer
//!                                                             │
//!                                                      CommandHistory (10)
//! ```
//!
//! The engine performs no POS operations itself; it hands matched commands
//! to host-registered `ActionHandler`s.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod catalog;
pub mod command;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod history;
pub mod ipc;
pub mod matching;
pub mod speech;

// Convenience re-exports for downstream crates
pub use catalog::{ActionKind, Category, Intent, CATALOG};
pub use command::{CommandParameters, CommandResult, MatchOutcome, PaymentMethod};
pub use dispatch::{ActionHandler, Dispatch, Dispatcher};
pub use engine::{EngineConfig, SessionSnapshot, StatusHandle, VoxEngine};
pub use error::VoxError;
pub use history::{CommandHistory, HISTORY_CAPACITY};
pub use ipc::events::{
    RecognitionErrorCode, RecognitionEvent, SessionState, SessionStatusEvent, Utterance,
};
pub use matching::IntentMatcher;
pub use speech::{RecognizerConfig, SpeechRecognizer, SpeechSynthesizer, VoiceSettings};
