//! Types exchanged with the host application.
//!
//! All outbound types derive `serde::Serialize` so the host can forward them
//! to its UI layer unchanged.

pub mod events;
