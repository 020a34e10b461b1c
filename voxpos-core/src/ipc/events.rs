//! Event types crossing the host boundary.
//!
//! ## Inbound (host → engine)
//!
//! Speech-capability callbacks arrive as loosely typed JSON shaped like the
//! Web Speech API. [`RecognitionEvent::decode`] narrows them at the boundary:
//!
//! | Payload `type` | Decoded as |
//! |----------------|------------|
//! | `"start"` | `RecognitionEvent::Started` |
//! | `"result"` + `isFinal: false` | `RecognitionEvent::Interim` |
//! | `"result"` + `isFinal: true` | `RecognitionEvent::Final` |
//! | `"error"` | `RecognitionEvent::Error` |
//! | `"end"` | `RecognitionEvent::Ended` |
//!
//! ## Outbound (engine → UI)
//!
//! `SessionStatusEvent` on every state change and the finished
//! `CommandResult` for every finalized utterance, both over
//! `tokio::sync::broadcast`.

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// Listening session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Not capturing. `start()` is accepted.
    #[default]
    Idle,
    /// Capture session active; waiting for a final result.
    Listening,
}

/// Emitted whenever the session state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusEvent {
    pub state: SessionState,
    /// Optional human-readable detail (e.g. the recognition error code).
    pub detail: Option<String>,
}

// ---------------------------------------------------------------------------
// Recognition events
// ---------------------------------------------------------------------------

/// Error codes reported by the speech capture capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionErrorCode {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    LanguageNotSupported,
    /// Any code this engine does not know about.
    #[serde(other)]
    Other,
}

/// One recognition hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utterance {
    pub transcript: String,
    /// Recognizer confidence in [0.0, 1.0].
    pub confidence: f32,
    pub is_final: bool,
}

impl Utterance {
    /// Build an utterance, clamping confidence into [0, 1] (NaN becomes 0).
    pub fn new(transcript: impl Into<String>, confidence: f32, is_final: bool) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            transcript: transcript.into(),
            confidence,
            is_final,
        }
    }
}

/// Narrow, decoded form of a speech-capability callback.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Started,
    Interim(Utterance),
    Final(Utterance),
    Error(RecognitionErrorCode),
    Ended,
}

/// Wire shape of the host payload.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawRecognitionEvent {
    Start,
    #[serde(rename_all = "camelCase")]
    Result {
        #[serde(default)]
        is_final: bool,
        #[serde(default)]
        transcript: String,
        /// Some engines omit confidence on interim results.
        #[serde(default)]
        confidence: Option<f32>,
    },
    Error {
        error: RecognitionErrorCode,
    },
    End,
}

impl From<RawRecognitionEvent> for RecognitionEvent {
    fn from(raw: RawRecognitionEvent) -> Self {
        match raw {
            RawRecognitionEvent::Start => RecognitionEvent::Started,
            RawRecognitionEvent::Result {
                is_final,
                transcript,
                confidence,
            } => {
                let utterance = Utterance::new(transcript, confidence.unwrap_or(0.0), is_final);
                if is_final {
                    RecognitionEvent::Final(utterance)
                } else {
                    RecognitionEvent::Interim(utterance)
                }
            }
            RawRecognitionEvent::Error { error } => RecognitionEvent::Error(error),
            RawRecognitionEvent::End => RecognitionEvent::Ended,
        }
    }
}

impl RecognitionEvent {
    /// Decode a JSON payload from the host capability.
    ///
    /// # Errors
    /// `VoxError::InvalidEvent` when the payload has an unknown `type` or is
    /// not valid JSON.
    pub fn decode(payload: &str) -> Result<Self> {
        let raw: RawRecognitionEvent = serde_json::from_str(payload)?;
        Ok(raw.into())
    }

    /// Same as [`decode`](Self::decode) for an already-parsed value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let raw: RawRecognitionEvent = serde_json::from_value(value)?;
        Ok(raw.into())
    }

    /// Convenience constructor for a final result.
    pub fn final_result(transcript: impl Into<String>, confidence: f32) -> Self {
        RecognitionEvent::Final(Utterance::new(transcript, confidence, true))
    }

    /// Convenience constructor for an interim result.
    pub fn interim(transcript: impl Into<String>, confidence: f32) -> Self {
        RecognitionEvent::Interim(Utterance::new(transcript, confidence, false))
    }
}
