//! Bounded most-recent-first command history.

use std::collections::VecDeque;

use crate::command::CommandResult;

/// Maximum number of results kept.
pub const HISTORY_CAPACITY: usize = 10;

/// Most-recent-first buffer of the last `HISTORY_CAPACITY` command results.
#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: VecDeque<CommandResult>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Prepend `result`, dropping the oldest entry past capacity.
    pub fn push(&mut self, result: CommandResult) {
        self.entries.push_front(result);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn latest(&self) -> Option<&CommandResult> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandResult> {
        self.entries.iter()
    }

    /// Owned copy, most recent first.
    pub fn snapshot(&self) -> Vec<CommandResult> {
        self.entries.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandParameters, MatchOutcome};
    use chrono::Utc;

    fn result(n: usize) -> CommandResult {
        CommandResult {
            transcript: format!("lệnh {n}"),
            confidence: 0.9,
            action_kind: None,
            outcome: MatchOutcome::NoMatch,
            parameters: CommandParameters::default(),
            success: false,
            message: String::new(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut history = CommandHistory::new();
        history.push(result(1));
        history.push(result(2));
        assert_eq!(history.latest().map(|r| r.transcript.as_str()), Some("lệnh 2"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn eleventh_push_evicts_the_oldest() {
        let mut history = CommandHistory::new();
        for n in 1..=HISTORY_CAPACITY + 1 {
            history.push(result(n));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);

        let transcripts: Vec<String> = history.iter().map(|r| r.transcript.clone()).collect();
        assert_eq!(transcripts.first().map(String::as_str), Some("lệnh 11"));
        assert_eq!(transcripts.last().map(String::as_str), Some("lệnh 2"));
        assert!(!transcripts.iter().any(|t| t == "lệnh 1"));
    }

    #[test]
    fn snapshot_is_detached_from_later_pushes() {
        let mut history = CommandHistory::new();
        history.push(result(1));
        let snapshot = history.snapshot();
        history.push(result(2));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn clear_empties_history() {
        let mut history = CommandHistory::new();
        history.push(result(1));
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
