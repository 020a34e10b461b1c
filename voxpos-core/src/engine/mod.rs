//! `VoxEngine` — listening session lifecycle and per-utterance orchestration.
//!
//! ## Lifecycle
//!
//! ```text
//! VoxEngine::new(config, recognizer, synthesizer)
//!     └─► start()                 → recognizer.start(), state = Listening
//!         ├─► Interim(..)         → live transcript updated, nothing else
//!         ├─► Final(..)           → pipeline::run, state = Idle
//!         ├─► Error(code)         → apology spoken, state = Idle
//!         ├─► Ended               → state = Idle
//!         └─► stop()              → recognizer.stop(), state = Idle
//! ```
//!
//! `start()` while listening and `stop()` while idle are no-ops. When the host
//! has no speech recognizer the engine is permanently unsupported and every
//! `start()` fails with `VoxError::CapabilityUnavailable`.
//!
//! ## Threading
//!
//! The engine is driven from a single logical thread: the host calls
//! `start`/`stop`/`handle_event` with `&mut self`, and each finalized utterance
//! is processed to completion before the call returns. UI readers on other
//! threads observe the session through [`StatusHandle`] and the broadcast
//! channels, never through the engine itself.

pub mod pipeline;

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    catalog::ActionKind,
    command::CommandResult,
    dispatch::{ActionHandler, Dispatcher},
    error::{Result, VoxError},
    feedback::{error_message, FeedbackSynthesizer},
    history::CommandHistory,
    ipc::events::{
        RecognitionErrorCode, RecognitionEvent, SessionState, SessionStatusEvent, Utterance,
    },
    matching::{IntentMatcher, DEFAULT_CONFIDENCE_THRESHOLD},
    speech::{RecognizerConfig, SpeechRecognizer, SpeechSynthesizer, VoiceSettings},
};

use self::pipeline::{PipelineContext, PipelineDiagnostics};

/// Broadcast channel capacity for status and command events.
const BROADCAST_CAP: usize = 64;

/// Configuration for `VoxEngine`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// BCP-47 language tag for recognition and feedback. Default: `"vi-VN"`.
    pub language: String,
    /// A trigger match becomes a command only when confidence is strictly
    /// greater than this. Default: 0.70.
    pub confidence_threshold: f32,
    /// Ask the recognizer for interim hypotheses. Default: true.
    pub interim_results: bool,
    /// Keep the recognizer running after a final result. Default: false
    /// (one command per activation).
    pub continuous: bool,
    /// Default: 1.
    pub max_alternatives: u32,
    /// Feedback speech rate. Default: 1.0.
    pub speech_rate: f32,
    /// Feedback speech pitch. Default: 1.0.
    pub speech_pitch: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            language: "vi-VN".into(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            interim_results: true,
            continuous: false,
            max_alternatives: 1,
            speech_rate: 1.0,
            speech_pitch: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn recognizer_config(&self) -> RecognizerConfig {
        RecognizerConfig {
            continuous: self.continuous,
            interim_results: self.interim_results,
            language: self.language.clone(),
            max_alternatives: self.max_alternatives,
        }
    }

    pub fn voice_settings(&self) -> VoiceSettings {
        VoiceSettings {
            language: self.language.clone(),
            rate: self.speech_rate,
            pitch: self.speech_pitch,
        }
    }
}

/// Cloneable read-only view of the session state for other threads.
#[derive(Debug, Clone)]
pub struct StatusHandle(Arc<Mutex<SessionState>>);

impl StatusHandle {
    pub fn get(&self) -> SessionState {
        *self.0.lock()
    }
}

/// Everything the UI renders about the session, copied out at one instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub supported: bool,
    pub interim_transcript: String,
    pub confidence: f32,
    pub last_result: Option<CommandResult>,
    pub history: Vec<CommandResult>,
}

/// The voice-command session manager.
pub struct VoxEngine {
    config: EngineConfig,
    /// `None` when the host has no speech capture; fixed for the engine's life.
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    matcher: IntentMatcher,
    dispatcher: Dispatcher,
    feedback: FeedbackSynthesizer,
    history: CommandHistory,
    status: Arc<Mutex<SessionState>>,
    interim_transcript: String,
    live_confidence: f32,
    last_result: Option<CommandResult>,
    diagnostics: PipelineDiagnostics,
    status_tx: broadcast::Sender<SessionStatusEvent>,
    command_tx: broadcast::Sender<CommandResult>,
}

impl VoxEngine {
    /// Create an engine. Availability of `recognizer` is checked here, once.
    pub fn new(
        config: EngineConfig,
        recognizer: Option<Box<dyn SpeechRecognizer>>,
        synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    ) -> Self {
        if recognizer.is_none() {
            warn!("speech recognition unavailable; voice commands disabled");
        }
        if synthesizer.is_none() {
            info!("speech synthesis unavailable; feedback is display-only");
        }

        let (status_tx, _) = broadcast::channel(BROADCAST_CAP);
        let (command_tx, _) = broadcast::channel(BROADCAST_CAP);

        Self {
            matcher: IntentMatcher::new(crate::catalog::CATALOG, config.confidence_threshold),
            feedback: FeedbackSynthesizer::new(synthesizer, config.voice_settings()),
            config,
            recognizer,
            dispatcher: Dispatcher::new(),
            history: CommandHistory::new(),
            status: Arc::new(Mutex::new(SessionState::Idle)),
            interim_transcript: String::new(),
            live_confidence: 0.0,
            last_result: None,
            diagnostics: PipelineDiagnostics::default(),
            status_tx,
            command_tx,
        }
    }

    /// Register the host handler for `kind`.
    pub fn register_handler<H: ActionHandler>(&mut self, kind: ActionKind, handler: H) {
        self.dispatcher.register(kind, handler);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `false` when no speech recognizer was provided; `start()` will always fail.
    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Begin a listening session.
    ///
    /// # Errors
    /// - `VoxError::CapabilityUnavailable` if the host has no recognizer.
    /// - `VoxError::RecognitionStart` if the recognizer refuses to start; the
    ///   session stays idle.
    pub fn start(&mut self) -> Result<()> {
        if !self.is_supported() {
            return Err(VoxError::CapabilityUnavailable);
        }
        if self.state() == SessionState::Listening {
            debug!("start() ignored: already listening");
            return Ok(());
        }

        self.interim_transcript.clear();
        self.live_confidence = 0.0;
        let recognizer_config = self.config.recognizer_config();
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.start(&recognizer_config).map_err(|e| match e {
                VoxError::RecognitionStart(_) => e,
                other => VoxError::RecognitionStart(other.to_string()),
            })?;
        }
        self.set_state(SessionState::Listening, None);
        info!("listening");
        Ok(())
    }

    /// End the listening session. No-op when idle.
    pub fn stop(&mut self) {
        if self.state() == SessionState::Idle {
            return;
        }
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        self.set_state(SessionState::Idle, None);
        info!("stop requested");
    }

    /// Feed one decoded capability event into the session.
    ///
    /// Returns the command result for `Final` events.
    ///
    /// # Errors
    /// `VoxError::Handler` if the host handler for a matched command failed.
    /// Feedback and history have already been updated when this is returned.
    pub fn handle_event(&mut self, event: RecognitionEvent) -> Result<Option<CommandResult>> {
        match event {
            RecognitionEvent::Started => {
                debug!("recognizer reported start");
                Ok(None)
            }
            RecognitionEvent::Interim(utterance) => {
                self.on_interim_result(&utterance.transcript, utterance.confidence);
                Ok(None)
            }
            RecognitionEvent::Final(utterance) => self.on_final_utterance(&utterance).map(Some),
            RecognitionEvent::Error(code) => {
                self.on_error(code);
                Ok(None)
            }
            RecognitionEvent::Ended => {
                if self.state() == SessionState::Listening {
                    debug!("recognizer ended without a final result");
                    self.set_state(SessionState::Idle, None);
                }
                Ok(None)
            }
        }
    }

    /// Decode a JSON capability payload and feed it in.
    ///
    /// # Errors
    /// `VoxError::InvalidEvent` for malformed payloads, otherwise as
    /// [`handle_event`](Self::handle_event).
    pub fn handle_payload(&mut self, payload: &str) -> Result<Option<CommandResult>> {
        let event = RecognitionEvent::decode(payload)?;
        self.handle_event(event)
    }

    /// Update the live transcript. Never matches or dispatches.
    pub fn on_interim_result(&mut self, transcript: &str, confidence: f32) {
        let utterance = Utterance::new(transcript, confidence, false);
        self.interim_transcript = utterance.transcript;
        self.live_confidence = utterance.confidence;
    }

    /// Run the full pipeline for a final transcript, then return to idle.
    ///
    /// # Errors
    /// `VoxError::Handler` if the dispatched host handler failed.
    pub fn on_final_result(&mut self, transcript: &str, confidence: f32) -> Result<CommandResult> {
        self.on_final_utterance(&Utterance::new(transcript, confidence, true))
    }

    /// Handle a mid-session recognition failure: apologise, go idle, record nothing.
    pub fn on_error(&mut self, code: RecognitionErrorCode) {
        warn!(?code, "speech recognition error");
        self.diagnostics.recognition_errors += 1;
        self.feedback.speak(error_message(code));
        self.set_state(SessionState::Idle, Some(format!("{code:?}")));
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.status.lock()
    }

    /// A handle that reads the session state from any thread.
    pub fn status_handle(&self) -> StatusHandle {
        StatusHandle(Arc::clone(&self.status))
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn last_result(&self) -> Option<&CommandResult> {
        self.last_result.as_ref()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            supported: self.is_supported(),
            interim_transcript: self.interim_transcript.clone(),
            confidence: self.live_confidence,
            last_result: self.last_result.clone(),
            history: self.history.snapshot(),
        }
    }

    pub fn diagnostics_snapshot(&self) -> PipelineDiagnostics {
        self.diagnostics
    }

    /// Subscribe to session state changes.
    pub fn subscribe_status(&self) -> broadcast::Receiver<SessionStatusEvent> {
        self.status_tx.subscribe()
    }

    /// Subscribe to finished command results.
    pub fn subscribe_commands(&self) -> broadcast::Receiver<CommandResult> {
        self.command_tx.subscribe()
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn on_final_utterance(&mut self, utterance: &Utterance) -> Result<CommandResult> {
        if self.state() == SessionState::Idle {
            debug!("final result arrived after stop; processing anyway");
        }
        self.interim_transcript.clear();
        self.interim_transcript.push_str(&utterance.transcript);
        self.live_confidence = utterance.confidence;

        let output = pipeline::run(
            PipelineContext {
                matcher: &self.matcher,
                dispatcher: &mut self.dispatcher,
                feedback: &mut self.feedback,
                history: &mut self.history,
                diagnostics: &mut self.diagnostics,
            },
            utterance,
        );

        self.last_result = Some(output.result.clone());
        let _ = self.command_tx.send(output.result.clone());
        self.set_state(SessionState::Idle, None);

        output.dispatch.map(|_| output.result)
    }

    fn set_state(&self, new_state: SessionState, detail: Option<String>) {
        {
            let mut state = self.status.lock();
            if *state == new_state && detail.is_none() {
                return;
            }
            *state = new_state;
        }
        let _ = self.status_tx.send(SessionStatusEvent {
            state: new_state,
            detail,
        });
    }
}

impl std::fmt::Debug for VoxEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoxEngine")
            .field("state", &self.state())
            .field("supported", &self.is_supported())
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::stub::StubRecognizer;

    #[test]
    fn default_config_matches_recognizer_contract() {
        let config = EngineConfig::default();
        let rc = config.recognizer_config();
        assert!(!rc.continuous);
        assert!(rc.interim_results);
        assert_eq!(rc.language, "vi-VN");
        assert_eq!(rc.max_alternatives, 1);
        assert!((config.confidence_threshold - 0.70).abs() < f32::EPSILON);
    }

    #[test]
    fn unsupported_engine_never_starts() {
        let mut engine = VoxEngine::new(EngineConfig::default(), None, None);
        assert!(!engine.is_supported());
        assert!(matches!(engine.start(), Err(VoxError::CapabilityUnavailable)));
        assert!(matches!(engine.start(), Err(VoxError::CapabilityUnavailable)));
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn failed_recognizer_start_leaves_session_idle() {
        let recognizer = StubRecognizer::new();
        recognizer.fail_start_with("microphone busy");
        let mut engine =
            VoxEngine::new(EngineConfig::default(), Some(Box::new(recognizer.clone())), None);

        let err = engine.start().expect_err("start should fail");
        assert!(matches!(err, VoxError::RecognitionStart(_)));
        assert_eq!(engine.state(), SessionState::Idle);
    }

    struct RefusingRecognizer;

    impl SpeechRecognizer for RefusingRecognizer {
        fn start(&mut self, _config: &RecognizerConfig) -> Result<()> {
            Err(anyhow::anyhow!("permission prompt dismissed").into())
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn any_recognizer_start_failure_is_reported_as_start_error() {
        let mut engine =
            VoxEngine::new(EngineConfig::default(), Some(Box::new(RefusingRecognizer)), None);

        match engine.start() {
            Err(VoxError::RecognitionStart(reason)) => {
                assert!(reason.contains("permission prompt dismissed"));
            }
            other => panic!("expected RecognitionStart, got {other:?}"),
        }
        assert_eq!(engine.state(), SessionState::Idle);
    }

    #[test]
    fn interim_confidence_is_clamped() {
        let mut engine =
            VoxEngine::new(EngineConfig::default(), Some(Box::new(StubRecognizer::new())), None);
        engine.start().expect("start");

        engine.on_interim_result("tìm", 7.5);
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.confidence, 1.0);
        assert!(engine.history().is_empty());

        engine.on_interim_result("tìm", f32::NAN);
        assert_eq!(engine.snapshot().confidence, 0.0);
    }

    #[test]
    fn status_handle_tracks_state() {
        let mut engine =
            VoxEngine::new(EngineConfig::default(), Some(Box::new(StubRecognizer::new())), None);
        let handle = engine.status_handle();
        engine.start().expect("start");
        assert_eq!(handle.get(), SessionState::Listening);
        engine.stop();
        assert_eq!(handle.get(), SessionState::Idle);
    }

    #[test]
    fn error_detail_is_broadcast() {
        let mut engine =
            VoxEngine::new(EngineConfig::default(), Some(Box::new(StubRecognizer::new())), None);
        let mut rx = engine.subscribe_status();
        engine.start().expect("start");
        engine.on_error(RecognitionErrorCode::NoSpeech);

        let listening = rx.try_recv().expect("listening event");
        assert_eq!(listening.state, SessionState::Listening);
        let idle = rx.try_recv().expect("idle event");
        assert_eq!(idle.state, SessionState::Idle);
        assert_eq!(idle.detail.as_deref(), Some("NoSpeech"));
    }
}
