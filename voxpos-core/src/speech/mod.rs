//! Host speech capabilities.
//!
//! The engine never reaches for a global speech object. Recognition and
//! synthesis are injected as trait objects so tests (and non-browser hosts)
//! can drive the session with deterministic doubles from [`stub`].
//!
//! Recognition is push-based: `SpeechRecognizer::start` only asks the host
//! to begin capturing. Results come back later as
//! [`RecognitionEvent`](crate::ipc::events::RecognitionEvent)s that the host
//! feeds into `VoxEngine::handle_event`.

pub mod stub;

use crate::error::Result;

/// Capture configuration handed to the recognizer on every `start()`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizerConfig {
    /// Keep listening after the first final result.
    pub continuous: bool,
    /// Emit interim hypotheses while the speaker is talking.
    pub interim_results: bool,
    /// BCP-47 language tag, e.g. `"vi-VN"`.
    pub language: String,
    pub max_alternatives: u32,
}

/// Fixed voice parameters for spoken feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

/// Speech capture capability.
pub trait SpeechRecognizer: Send + 'static {
    /// Begin a capture session.
    ///
    /// # Errors
    /// Returns an error if the host refuses to start (device busy, permission
    /// prompt dismissed, ...).
    fn start(&mut self, config: &RecognizerConfig) -> Result<()>;

    /// Ask the capture session to end. Results already in flight may still
    /// be delivered afterwards.
    fn stop(&mut self);
}

/// Text-to-speech capability.
pub trait SpeechSynthesizer: Send + 'static {
    /// Speak `text`. Failures are reported but never block the caller.
    fn speak(&mut self, text: &str, voice: &VoiceSettings) -> Result<()>;
}
