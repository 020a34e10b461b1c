//! Per-utterance pipeline.
//!
//! ## Stages (one finalized transcript)
//!
//! ```text
//! 1. IntentMatcher::classify   → first catalog hit + confidence gate
//! 2. extract::extract          → typed parameters (matched only)
//! 3. build CommandResult       → message composed, timestamp taken
//! 4. Dispatcher::dispatch      → host handler (matched + confident only)
//! 5. FeedbackSynthesizer::speak → always, exactly once
//! 6. CommandHistory::push      → always
//! ```
//!
//! All stages run synchronously on the caller's turn. A handler failure in
//! stage 4 does not short-circuit stages 5–6; it is returned alongside the
//! result so the session can hand it to the host afterwards.

use chrono::Utc;
use tracing::{debug, info, info_span, warn};

use crate::{
    command::{CommandResult, MatchOutcome},
    dispatch::{Dispatch, Dispatcher},
    error::Result,
    extract::extract,
    feedback::{compose_message, FeedbackSynthesizer},
    history::CommandHistory,
    ipc::events::Utterance,
    matching::IntentMatcher,
};

/// Counters for observability; reset on demand by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineDiagnostics {
    pub finals_processed: usize,
    pub matched: usize,
    pub low_confidence: usize,
    pub no_match: usize,
    pub dispatched: usize,
    pub handler_errors: usize,
    pub recognition_errors: usize,
}

impl PipelineDiagnostics {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn record_outcome(&mut self, outcome: MatchOutcome) {
        self.finals_processed += 1;
        match outcome {
            MatchOutcome::Matched => self.matched += 1,
            MatchOutcome::LowConfidenceMatch => self.low_confidence += 1,
            MatchOutcome::NoMatch => self.no_match += 1,
        }
    }
}

/// Borrowed engine components the pipeline drives.
pub struct PipelineContext<'a> {
    pub matcher: &'a IntentMatcher,
    pub dispatcher: &'a mut Dispatcher,
    pub feedback: &'a mut FeedbackSynthesizer,
    pub history: &'a mut CommandHistory,
    pub diagnostics: &'a mut PipelineDiagnostics,
}

/// What one pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutput {
    pub result: CommandResult,
    /// Dispatch outcome; `Err` only when the host handler failed.
    pub dispatch: Result<Dispatch>,
}

/// Classify and extract without side effects.
pub fn build_result(matcher: &IntentMatcher, transcript: &str, confidence: f32) -> CommandResult {
    let classified = matcher.classify(transcript, confidence);
    let accepted = classified.accepted();
    let parameters = accepted
        .map(|intent| extract(intent.action_kind, transcript))
        .unwrap_or_default();
    let message = compose_message(accepted, classified.outcome, &parameters);

    CommandResult {
        transcript: transcript.to_string(),
        confidence,
        action_kind: accepted.map(|intent| intent.action_kind),
        outcome: classified.outcome,
        parameters,
        success: accepted.is_some(),
        message,
        timestamp: Utc::now(),
    }
}

/// Run every stage for one finalized utterance.
pub fn run(ctx: PipelineContext<'_>, utterance: &Utterance) -> PipelineOutput {
    let span = info_span!("utterance", confidence = utterance.confidence);
    let _guard = span.enter();

    let result = build_result(ctx.matcher, &utterance.transcript, utterance.confidence);
    ctx.diagnostics.record_outcome(result.outcome);
    if !result.parameters.is_empty() {
        debug!(parameters = ?result.parameters, "parameters extracted");
    }

    let dispatch = ctx.dispatcher.dispatch(&result);
    match &dispatch {
        Ok(Dispatch::Handled(_)) => ctx.diagnostics.dispatched += 1,
        Ok(_) => {}
        Err(e) => {
            ctx.diagnostics.handler_errors += 1;
            warn!("action handler failed: {e}");
        }
    }

    ctx.feedback.speak(&result.message);
    ctx.history.push(result.clone());

    info!(
        transcript = %result.transcript,
        action = result.action_kind.map(|k| k.as_str()),
        outcome = ?result.outcome,
        "utterance processed"
    );

    PipelineOutput { result, dispatch }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionKind;
    use crate::speech::stub::RecordingSynthesizer;
    use crate::speech::VoiceSettings;

    #[test]
    fn build_result_for_add_product() {
        let result = build_result(&IntentMatcher::default(), "thêm sản phẩm iPhone 15", 0.92);
        assert!(result.success);
        assert_eq!(result.action_kind, Some(ActionKind::AddProduct));
        assert_eq!(result.parameters.product_name(), Some("iPhone 15"));
        assert_eq!(result.message, "Đã thêm sản phẩm: iPhone 15");
    }

    #[test]
    fn low_confidence_result_carries_no_parameters() {
        let result = build_result(&IntentMatcher::default(), "giảm giá 10 phần trăm", 0.5);
        assert!(!result.success);
        assert_eq!(result.action_kind, None);
        assert_eq!(result.outcome, MatchOutcome::LowConfidenceMatch);
        assert!(result.parameters.is_empty());
    }

    #[test]
    fn discount_message_includes_percent() {
        let result = build_result(&IntentMatcher::default(), "Giảm giá 10 phần trăm", 0.9);
        assert_eq!(result.parameters.discount_percent(), Some(10));
        assert_eq!(result.message, "Áp dụng giảm giá 10%");
    }

    #[test]
    fn run_speaks_and_records_even_when_handler_fails() {
        let matcher = IntentMatcher::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(
            ActionKind::CancelOrder,
            |_: &CommandResult| -> anyhow::Result<()> { anyhow::bail!("order locked") },
        );
        let synth = RecordingSynthesizer::new();
        let mut feedback = FeedbackSynthesizer::new(
            Some(Box::new(synth.clone())),
            VoiceSettings {
                language: "vi-VN".into(),
                rate: 1.0,
                pitch: 1.0,
            },
        );
        let mut history = CommandHistory::new();
        let mut diagnostics = PipelineDiagnostics::default();

        let output = run(
            PipelineContext {
                matcher: &matcher,
                dispatcher: &mut dispatcher,
                feedback: &mut feedback,
                history: &mut history,
                diagnostics: &mut diagnostics,
            },
            &Utterance::new("hủy đơn hàng", 0.9, true),
        );

        assert!(output.dispatch.is_err());
        assert_eq!(synth.spoken(), vec!["Hủy đơn hàng".to_string()]);
        assert_eq!(history.len(), 1);
        assert_eq!(diagnostics.handler_errors, 1);
        assert_eq!(diagnostics.dispatched, 0);
        assert_eq!(diagnostics.finals_processed, 1);
    }
}
