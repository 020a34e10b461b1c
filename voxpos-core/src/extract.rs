//! Parameter extraction.
//!
//! Pure functions of `(ActionKind, transcript)`. Extraction never fails: a
//! missing pattern falls back to the documented default for that parameter.
//!
//! | Action | Parameter | Rule | Default |
//! |--------|-----------|------|---------|
//! | `AddProduct` | `productName` | text after the trigger phrase | `"sản phẩm"` |
//! | `SearchProduct` | `searchTerm` | text after the trigger phrase | `""` |
//! | `ApplyDiscount` | `discountPercent` | integer before `phần trăm` / `%` | `0` |
//! | `ProcessPayment` | `paymentMethod` | first keyword found | cash |

use std::num::IntErrorKind;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::{intent_for, ActionKind};
use crate::command::{CommandParameters, PaymentMethod};

/// Product name used when the cashier names no product.
pub const DEFAULT_PRODUCT_NAME: &str = "sản phẩm";

/// Keywords checked in this order; the first one present wins.
const PAYMENT_KEYWORDS: [(&str, PaymentMethod); 3] = [
    ("tiền mặt", PaymentMethod::Cash),
    ("thẻ", PaymentMethod::Card),
    ("chuyển khoản", PaymentMethod::Transfer),
];

fn discount_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([0-9]+)\s*(?:phần trăm|%)").expect("discount pattern is a valid regex")
    })
}

/// Extract structured parameters for `kind` from `transcript`.
pub fn extract(kind: ActionKind, transcript: &str) -> CommandParameters {
    match kind {
        ActionKind::AddProduct => {
            let product_name = remainder_after_trigger(kind, transcript)
                .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string());
            CommandParameters::AddProduct { product_name }
        }
        ActionKind::SearchProduct => CommandParameters::SearchProduct {
            search_term: remainder_after_trigger(kind, transcript).unwrap_or_default(),
        },
        ActionKind::ApplyDiscount => CommandParameters::ApplyDiscount {
            discount_percent: discount_percent(transcript),
        },
        ActionKind::ProcessPayment => CommandParameters::ProcessPayment {
            payment_method: payment_method(transcript),
        },
        ActionKind::RemoveProduct
        | ActionKind::PrintReceipt
        | ActionKind::NewCustomer
        | ActionKind::CancelOrder => CommandParameters::default(),
    }
}

/// Text following the first occurrence of `kind`'s trigger phrase, trimmed.
///
/// Casing of the remainder is preserved. Returns `None` when the trigger is
/// absent or nothing but whitespace / sentence punctuation follows it.
pub fn remainder_after_trigger(kind: ActionKind, transcript: &str) -> Option<String> {
    let trigger = intent_for(kind)?.trigger_phrase;
    let span = find_ignore_case(transcript, trigger)?;
    let rest = transcript[span.end..]
        .trim()
        .trim_end_matches(['.', ',', '!', '?'])
        .trim_end();
    (!rest.is_empty()).then(|| rest.to_string())
}

/// First integer immediately preceding a percent marker, clamped to 100.
pub fn discount_percent(transcript: &str) -> u8 {
    let lowered = transcript.to_lowercase();
    discount_pattern()
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| match digits.as_str().parse::<u32>() {
            Ok(n) => Some(n.min(100) as u8),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(100),
            Err(_) => None,
        })
        .unwrap_or(0)
}

/// First payment keyword (in `PAYMENT_KEYWORDS` order) found in the transcript.
pub fn payment_method(transcript: &str) -> PaymentMethod {
    let lowered = transcript.to_lowercase();
    PAYMENT_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, method)| *method)
        .unwrap_or_default()
}

/// Locate `needle` (already lowercase) in `haystack` ignoring case, returning
/// the byte range in the original `haystack`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    let mut lowered = String::with_capacity(haystack.len());
    // origin[i] = byte offset in `haystack` of the char that produced lowered byte i
    let mut origin = Vec::with_capacity(haystack.len() + 1);
    for (idx, ch) in haystack.char_indices() {
        for lower in ch.to_lowercase() {
            let before = lowered.len();
            lowered.push(lower);
            origin.extend(std::iter::repeat(idx).take(lowered.len() - before));
        }
    }
    origin.push(haystack.len());

    let start = lowered.find(needle)?;
    let end = start + needle.len();
    Some(origin[start]..origin[end])
}
