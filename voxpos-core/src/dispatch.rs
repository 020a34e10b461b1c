//! Host action dispatch.
//!
//! The engine does not perform POS operations itself. The host registers one
//! `ActionHandler` per `ActionKind`, and the dispatcher calls exactly one of
//! them for each confidently matched command. There are no retries and no
//! error recovery here: a handler error is wrapped and handed back to the host.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::catalog::ActionKind;
use crate::command::CommandResult;
use crate::error::{Result, VoxError};

/// A host-side POS operation.
pub trait ActionHandler: Send + 'static {
    fn handle(&mut self, command: &CommandResult) -> anyhow::Result<()>;
}

impl<F> ActionHandler for F
where
    F: FnMut(&CommandResult) -> anyhow::Result<()> + Send + 'static,
{
    fn handle(&mut self, command: &CommandResult) -> anyhow::Result<()> {
        self(command)
    }
}

/// What `Dispatcher::dispatch` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The handler for this kind ran and returned `Ok`.
    Handled(ActionKind),
    /// Unmatched or low-confidence result; nothing ran.
    NotDispatchable,
    /// Matched, but the host registered no handler for the kind.
    NoHandler(ActionKind),
}

/// Routes matched commands to host handlers by action kind.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<ActionKind, Box<dyn ActionHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `kind`.
    pub fn register<H: ActionHandler>(&mut self, kind: ActionKind, handler: H) {
        if self.handlers.insert(kind, Box::new(handler)).is_some() {
            debug!(%kind, "replaced action handler");
        }
    }

    pub fn has_handler(&self, kind: ActionKind) -> bool {
        self.handlers.contains_key(&kind)
    }

    /// Invoke the handler for `command`, if it is dispatchable.
    ///
    /// # Errors
    /// `VoxError::Handler` when the host handler fails.
    pub fn dispatch(&mut self, command: &CommandResult) -> Result<Dispatch> {
        let Some(kind) = command.action_kind.filter(|_| command.is_dispatchable()) else {
            return Ok(Dispatch::NotDispatchable);
        };
        let Some(handler) = self.handlers.get_mut(&kind) else {
            warn!(%kind, "no handler registered; command not dispatched");
            return Ok(Dispatch::NoHandler(kind));
        };

        debug!(%kind, "dispatching command");
        handler
            .handle(command)
            .map_err(|source| VoxError::Handler { kind, source })?;
        Ok(Dispatch::Handled(kind))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.handlers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("Dispatcher").field("handlers", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use chrono::Utc;

    use super::*;
    use crate::command::{CommandParameters, MatchOutcome};

    fn command(kind: Option<ActionKind>, outcome: MatchOutcome) -> CommandResult {
        CommandResult {
            transcript: "in hóa đơn".into(),
            confidence: 0.9,
            action_kind: kind,
            outcome,
            parameters: CommandParameters::default(),
            success: outcome == MatchOutcome::Matched,
            message: "In hóa đơn".into(),
            timestamp: Utc::now(),
        }
    }

    fn counting(counter: &Arc<AtomicUsize>) -> impl ActionHandler {
        let counter = Arc::clone(counter);
        move |_: &CommandResult| -> anyhow::Result<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn matched_command_runs_its_handler_once() {
        let printed = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(ActionKind::PrintReceipt, counting(&printed));
        dispatcher.register(ActionKind::CancelOrder, counting(&cancelled));

        let outcome = dispatcher
            .dispatch(&command(Some(ActionKind::PrintReceipt), MatchOutcome::Matched))
            .expect("dispatch");
        assert_eq!(outcome, Dispatch::Handled(ActionKind::PrintReceipt));
        assert_eq!(printed.load(Ordering::SeqCst), 1);
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn low_confidence_is_never_dispatched() {
        let printed = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(ActionKind::PrintReceipt, counting(&printed));

        let outcome = dispatcher
            .dispatch(&command(
                Some(ActionKind::PrintReceipt),
                MatchOutcome::LowConfidenceMatch,
            ))
            .expect("dispatch");
        assert_eq!(outcome, Dispatch::NotDispatchable);
        assert_eq!(printed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_handler_is_reported_not_failed() {
        let mut dispatcher = Dispatcher::new();
        let outcome = dispatcher
            .dispatch(&command(Some(ActionKind::NewCustomer), MatchOutcome::Matched))
            .expect("dispatch");
        assert_eq!(outcome, Dispatch::NoHandler(ActionKind::NewCustomer));
    }

    #[test]
    fn handler_errors_propagate_with_the_kind() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(ActionKind::PrintReceipt, |_: &CommandResult| -> anyhow::Result<()> {
            anyhow::bail!("printer offline")
        });

        let err = dispatcher
            .dispatch(&command(Some(ActionKind::PrintReceipt), MatchOutcome::Matched))
            .expect_err("handler failure should propagate");
        match err {
            VoxError::Handler { kind, source } => {
                assert_eq!(kind, ActionKind::PrintReceipt);
                assert_eq!(source.to_string(), "printer offline");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
