use thiserror::Error;

use crate::catalog::ActionKind;

/// All errors produced by voxpos-core.
///
/// Matching and extraction outcomes are never errors; they are carried as
/// values on `CommandResult`. Only capability-level failures and host
/// handler failures surface here.
#[derive(Debug, Error)]
pub enum VoxError {
    #[error("speech recognition is not available on this host")]
    CapabilityUnavailable,

    #[error("speech recognizer failed to start: {0}")]
    RecognitionStart(String),

    #[error("handler for {kind} failed: {source}")]
    Handler {
        kind: ActionKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid recognition event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, VoxError>;
