//! Stub speech capabilities.
//!
//! `StubRecognizer` records lifecycle calls instead of capturing audio, and
//! `RecordingSynthesizer` collects spoken lines instead of playing them. Both
//! share their logs through `Arc<Mutex<..>>` so a test can keep a handle after
//! the engine takes ownership of the boxed capability.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Result, VoxError};
use crate::speech::{RecognizerConfig, SpeechRecognizer, SpeechSynthesizer, VoiceSettings};

/// Lifecycle calls observed by a `StubRecognizer`.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerCall {
    Start(RecognizerConfig),
    Stop,
}

/// Recognizer that records calls and optionally refuses to start.
#[derive(Debug, Clone, Default)]
pub struct StubRecognizer {
    calls: Arc<Mutex<Vec<RecognizerCall>>>,
    fail_start: Arc<Mutex<Option<String>>>,
}

impl StubRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `start()` calls fail with `reason`.
    pub fn fail_start_with(&self, reason: impl Into<String>) {
        *self.fail_start.lock() = Some(reason.into());
    }

    pub fn calls(&self) -> Vec<RecognizerCall> {
        self.calls.lock().clone()
    }

    pub fn start_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, RecognizerCall::Start(_)))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, RecognizerCall::Stop))
            .count()
    }
}

impl SpeechRecognizer for StubRecognizer {
    fn start(&mut self, config: &RecognizerConfig) -> Result<()> {
        if let Some(reason) = self.fail_start.lock().clone() {
            return Err(VoxError::RecognitionStart(reason));
        }
        debug!(language = %config.language, "StubRecognizer::start");
        self.calls.lock().push(RecognizerCall::Start(config.clone()));
        Ok(())
    }

    fn stop(&mut self) {
        debug!("StubRecognizer::stop");
        self.calls.lock().push(RecognizerCall::Stop);
    }
}

/// Synthesizer that stores every spoken line.
#[derive(Debug, Clone, Default)]
pub struct RecordingSynthesizer {
    spoken: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A synthesizer whose every `speak()` fails after recording the line.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }
}

impl SpeechSynthesizer for RecordingSynthesizer {
    fn speak(&mut self, text: &str, _voice: &VoiceSettings) -> Result<()> {
        self.spoken.lock().push(text.to_string());
        if self.fail {
            return Err(VoxError::Other(anyhow::anyhow!("audio output unavailable")));
        }
        Ok(())
    }
}
