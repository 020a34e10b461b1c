//! `CommandResult` — the immutable outcome of one finalized utterance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ActionKind;

/// How the matcher classified a finalized transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchOutcome {
    /// Trigger phrase found and confidence above the gate.
    Matched,
    /// Trigger phrase found but confidence at or below the gate.
    LowConfidenceMatch,
    /// No trigger phrase found.
    NoMatch,
}

/// Payment method named in a payment command.
///
/// Serializes as the Vietnamese keyword the cashier spoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "tiền mặt")]
    Cash,
    #[serde(rename = "thẻ")]
    Card,
    #[serde(rename = "chuyển khoản")]
    Transfer,
}

impl PaymentMethod {
    /// Spoken keyword for this method.
    pub fn keyword(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "tiền mặt",
            PaymentMethod::Card => "thẻ",
            PaymentMethod::Transfer => "chuyển khoản",
        }
    }
}

/// Structured parameters extracted from a transcript.
///
/// Serializes to the flat camelCase map the UI expects
/// (`{"productName": "..."}`, `{}` for commands without parameters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum CommandParameters {
    AddProduct { product_name: String },
    SearchProduct { search_term: String },
    ApplyDiscount { discount_percent: u8 },
    ProcessPayment { payment_method: PaymentMethod },
    Empty {},
}

impl Default for CommandParameters {
    fn default() -> Self {
        CommandParameters::Empty {}
    }
}

impl CommandParameters {
    pub fn product_name(&self) -> Option<&str> {
        match self {
            CommandParameters::AddProduct { product_name } => Some(product_name),
            _ => None,
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        match self {
            CommandParameters::SearchProduct { search_term } => Some(search_term),
            _ => None,
        }
    }

    pub fn discount_percent(&self) -> Option<u8> {
        match self {
            CommandParameters::ApplyDiscount { discount_percent } => Some(*discount_percent),
            _ => None,
        }
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        match self {
            CommandParameters::ProcessPayment { payment_method } => Some(*payment_method),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CommandParameters::Empty {})
    }
}

/// Outcome of one finalized utterance. Built once, never mutated, and the
/// only thing recorded in the command history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub transcript: String,
    pub confidence: f32,
    /// Matched action, or `None` for "unknown".
    pub action_kind: Option<ActionKind>,
    pub outcome: MatchOutcome,
    pub parameters: CommandParameters,
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl CommandResult {
    /// `true` when the result should reach a host handler.
    pub fn is_dispatchable(&self) -> bool {
        self.success && self.outcome == MatchOutcome::Matched && self.action_kind.is_some()
    }
}
