//! Spoken / displayed feedback.
//!
//! Every finalized utterance produces exactly one message: the text composed
//! here is stored on the `CommandResult` and handed to the host synthesizer.
//! Recognition errors get their own apology, and are spoken but never stored.

use tracing::{debug, warn};

use crate::catalog::{ActionKind, Intent};
use crate::command::{CommandParameters, MatchOutcome};
use crate::ipc::events::RecognitionErrorCode;
use crate::speech::{SpeechSynthesizer, VoiceSettings};

/// Spoken when no trigger phrase was found.
pub const NOT_UNDERSTOOD_MESSAGE: &str = "Không hiểu lệnh. Vui lòng thử lại.";

/// Spoken when a trigger phrase was found but the recognizer was unsure.
pub const LOW_CONFIDENCE_MESSAGE: &str = "Chưa nghe rõ lệnh. Vui lòng nói lại rõ hơn.";

/// Message for a classified utterance.
pub fn compose_message(
    intent: Option<&Intent>,
    outcome: MatchOutcome,
    parameters: &CommandParameters,
) -> String {
    let intent = match (outcome, intent) {
        (MatchOutcome::Matched, Some(intent)) => intent,
        (MatchOutcome::LowConfidenceMatch, _) => return LOW_CONFIDENCE_MESSAGE.to_string(),
        _ => return NOT_UNDERSTOOD_MESSAGE.to_string(),
    };

    match (intent.action_kind, parameters) {
        (ActionKind::AddProduct, CommandParameters::AddProduct { product_name }) => {
            format!("Đã thêm sản phẩm: {product_name}")
        }
        (ActionKind::SearchProduct, CommandParameters::SearchProduct { search_term }) => {
            format!("Đang tìm kiếm: {search_term}")
        }
        (ActionKind::ApplyDiscount, CommandParameters::ApplyDiscount { discount_percent }) => {
            format!("Áp dụng giảm giá {discount_percent}%")
        }
        (ActionKind::ProcessPayment, CommandParameters::ProcessPayment { payment_method }) => {
            format!("Thanh toán bằng {}", payment_method.keyword())
        }
        _ => intent.description.to_string(),
    }
}

/// Apology spoken after a mid-session recognition failure.
pub fn error_message(code: RecognitionErrorCode) -> &'static str {
    match code {
        RecognitionErrorCode::NoSpeech => "Không nghe thấy giọng nói. Vui lòng thử lại.",
        RecognitionErrorCode::AudioCapture => "Không tìm thấy micro. Vui lòng kiểm tra thiết bị.",
        RecognitionErrorCode::NotAllowed | RecognitionErrorCode::ServiceNotAllowed => {
            "Chưa được cấp quyền sử dụng micro."
        }
        RecognitionErrorCode::Network => "Lỗi kết nối mạng khi nhận dạng giọng nói.",
        _ => "Xin lỗi, đã có lỗi khi nhận dạng giọng nói.",
    }
}

/// Best-effort wrapper around the host synthesizer.
pub struct FeedbackSynthesizer {
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    voice: VoiceSettings,
}

impl FeedbackSynthesizer {
    pub fn new(synthesizer: Option<Box<dyn SpeechSynthesizer>>, voice: VoiceSettings) -> Self {
        Self { synthesizer, voice }
    }

    pub fn is_available(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Speak `message`. A missing synthesizer is a no-op; a failing one is
    /// logged and ignored.
    pub fn speak(&mut self, message: &str) {
        let Some(synthesizer) = self.synthesizer.as_mut() else {
            debug!("no speech synthesizer; feedback is display-only");
            return;
        };
        if let Err(e) = synthesizer.speak(message, &self.voice) {
            warn!("speech feedback failed: {e}");
        }
    }
}

impl std::fmt::Debug for FeedbackSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackSynthesizer")
            .field("available", &self.is_available())
            .field("voice", &self.voice)
            .finish()
    }
}
