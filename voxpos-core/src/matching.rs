//! Intent matching: first catalog entry whose trigger phrase occurs in the
//! lowercased transcript, promoted to a command only above the confidence gate.

use tracing::debug;

use crate::catalog::{Intent, CATALOG};
use crate::command::MatchOutcome;

/// Default confidence gate. A match needs strictly more than this.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.70;

/// Result of scanning the catalog for one transcript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntentMatch {
    /// The first catalog entry whose phrase occurs in the transcript, even
    /// when the confidence gate rejected it.
    pub intent: Option<&'static Intent>,
    pub outcome: MatchOutcome,
}

impl IntentMatch {
    /// The intent, only when it passed the confidence gate.
    pub fn accepted(&self) -> Option<&'static Intent> {
        match self.outcome {
            MatchOutcome::Matched => self.intent,
            _ => None,
        }
    }
}

/// Stateless matcher over a fixed, ordered catalog.
#[derive(Debug, Clone, Copy)]
pub struct IntentMatcher {
    catalog: &'static [Intent],
    threshold: f32,
}

impl Default for IntentMatcher {
    fn default() -> Self {
        Self::new(CATALOG, DEFAULT_CONFIDENCE_THRESHOLD)
    }
}

impl IntentMatcher {
    pub fn new(catalog: &'static [Intent], threshold: f32) -> Self {
        Self { catalog, threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// First entry, in declaration order, whose trigger phrase is a substring
    /// of the lowercased transcript.
    pub fn find(&self, transcript: &str) -> Option<&'static Intent> {
        let lowered = transcript.to_lowercase();
        self.catalog
            .iter()
            .find(|intent| lowered.contains(intent.trigger_phrase))
    }

    /// Scan the catalog and apply the confidence gate.
    pub fn classify(&self, transcript: &str, confidence: f32) -> IntentMatch {
        let intent = self.find(transcript);
        let outcome = match intent {
            None => MatchOutcome::NoMatch,
            Some(_) if confidence > self.threshold => MatchOutcome::Matched,
            Some(_) => MatchOutcome::LowConfidenceMatch,
        };
        debug!(
            transcript,
            confidence,
            action = intent.map(|i| i.action_kind.as_str()),
            ?outcome,
            "intent classified"
        );
        IntentMatch { intent, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ActionKind, Category};

    #[test]
    fn matches_case_insensitively() {
        let m = IntentMatcher::default().classify("Tìm Kiếm laptop Dell", 0.85);
        assert_eq!(m.outcome, MatchOutcome::Matched);
        assert_eq!(m.accepted().map(|i| i.action_kind), Some(ActionKind::SearchProduct));
    }

    #[test]
    fn every_example_matches_its_own_entry() {
        let matcher = IntentMatcher::default();
        for intent in CATALOG {
            let m = matcher.classify(intent.example, 0.9);
            assert_eq!(m.intent.map(|i| i.action_kind), Some(intent.action_kind));
        }
    }

    #[test]
    fn first_declared_entry_wins_on_overlap() {
        // Contains both "thêm sản phẩm" and "thanh toán".
        let m = IntentMatcher::default().classify("thanh toán xong rồi thêm sản phẩm sạc", 0.95);
        assert_eq!(m.accepted().map(|i| i.action_kind), Some(ActionKind::AddProduct));

        // "giảm giá" is declared after "thanh toán".
        let m = IntentMatcher::default().classify("giảm giá 10% rồi thanh toán", 0.95);
        assert_eq!(m.accepted().map(|i| i.action_kind), Some(ActionKind::ProcessPayment));
    }

    #[test]
    fn reordering_the_catalog_changes_the_winner() {
        static REVERSED: [Intent; 2] = [
            Intent {
                trigger_phrase: "thanh toán",
                action_kind: ActionKind::ProcessPayment,
                category: Category::Payment,
                description: "",
                example: "",
            },
            Intent {
                trigger_phrase: "thêm sản phẩm",
                action_kind: ActionKind::AddProduct,
                category: Category::Product,
                description: "",
                example: "",
            },
        ];
        let matcher = IntentMatcher::new(&REVERSED, DEFAULT_CONFIDENCE_THRESHOLD);
        let m = matcher.classify("thanh toán xong rồi thêm sản phẩm sạc", 0.95);
        assert_eq!(m.accepted().map(|i| i.action_kind), Some(ActionKind::ProcessPayment));
    }

    #[test]
    fn gate_is_strictly_greater_than_threshold() {
        let matcher = IntentMatcher::default();
        let at = matcher.classify("in hóa đơn", 0.70);
        assert_eq!(at.outcome, MatchOutcome::LowConfidenceMatch);
        assert!(at.accepted().is_none());
        assert_eq!(at.intent.map(|i| i.action_kind), Some(ActionKind::PrintReceipt));

        let above = matcher.classify("in hóa đơn", 0.71);
        assert_eq!(above.outcome, MatchOutcome::Matched);
    }

    #[test]
    fn no_trigger_is_no_match_regardless_of_confidence() {
        let matcher = IntentMatcher::default();
        assert_eq!(matcher.classify("xin chào", 0.99).outcome, MatchOutcome::NoMatch);
        assert_eq!(matcher.classify("xin chào", 0.10).outcome, MatchOutcome::NoMatch);
        assert_eq!(matcher.classify("", 1.0).outcome, MatchOutcome::NoMatch);
    }
}
