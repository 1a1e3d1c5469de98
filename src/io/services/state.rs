//! Run state machine shared by export and import.
//!
//! ```text
//! export: Init → ValidatingPath → Processing → Packaging → Committing → Done
//! import: Init → ValidatingPath → Unpacking → Processing → Committing → Done
//! ```
//!
//! `Failed` is reachable from every non-terminal state.

use crate::{Error, Result};
use std::fmt;

/// Which orchestrator a run belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Graph to tables.
    Export,
    /// Tables to graph.
    Import,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Export => write!(f, "export"),
            Self::Import => write!(f, "import"),
        }
    }
}

/// Phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Created, nothing done.
    Init,
    /// Checking the input or output path.
    ValidatingPath,
    /// Reading or writing tables.
    Processing,
    /// Bundling tables into the archive (export).
    Packaging,
    /// Listing archive or folder entries (import).
    Unpacking,
    /// Committing the store transaction.
    Committing,
    /// Finished successfully.
    Done,
    /// Aborted; the transaction was rolled back.
    Failed,
}

impl RunState {
    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if `next` may follow `self` in a run of `kind`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self, kind: RunKind) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Self::Failed) {
            return true;
        }
        match kind {
            RunKind::Export => matches!(
                (self, next),
                (Self::Init, Self::ValidatingPath)
                    | (Self::ValidatingPath, Self::Processing)
                    | (Self::Processing, Self::Packaging | Self::Committing)
                    | (Self::Packaging, Self::Committing)
                    | (Self::Committing, Self::Done)
            ),
            RunKind::Import => matches!(
                (self, next),
                (Self::Init, Self::ValidatingPath)
                    | (Self::ValidatingPath, Self::Unpacking)
                    | (Self::Unpacking, Self::Processing)
                    | (Self::Processing, Self::Committing)
                    | (Self::Committing, Self::Done)
            ),
        }
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::ValidatingPath => "VALIDATING_PATH",
            Self::Processing => "PROCESSING",
            Self::Packaging => "PACKAGING",
            Self::Unpacking => "UNPACKING",
            Self::Committing => "COMMITTING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current state of one run and the path taken.
#[derive(Debug, Clone)]
pub struct RunTracker {
    kind: RunKind,
    history: Vec<RunState>,
}

impl RunTracker {
    /// Starts a run in [`RunState::Init`].
    #[must_use]
    pub fn new(kind: RunKind) -> Self {
        Self {
            kind,
            history: vec![RunState::Init],
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.history.last().copied().unwrap_or(RunState::Init)
    }

    /// States visited so far, in order.
    #[must_use]
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the transition is not allowed.
    pub fn advance(&mut self, next: RunState) -> Result<()> {
        let current = self.state();
        if !current.can_transition_to(next, self.kind) {
            return Err(Error::OperationFailed {
                operation: format!("{}_state", self.kind),
                cause: format!("illegal transition {current} -> {next}"),
            });
        }
        tracing::debug!(run = %self.kind, from = %current, to = %next, "Run state changed");
        self.history.push(next);
        Ok(())
    }

    /// Moves to [`RunState::Failed`] unless already terminal.
    pub fn fail(&mut self) {
        if !self.state().is_terminal() {
            tracing::debug!(run = %self.kind, from = %self.state(), "Run failed");
            self.history.push(RunState::Failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(RunState::Init, RunState::ValidatingPath, true ; "start")]
    #[test_case(RunState::Processing, RunState::Packaging, true ; "package")]
    #[test_case(RunState::Processing, RunState::Committing, true ; "no archive")]
    #[test_case(RunState::ValidatingPath, RunState::Unpacking, false ; "unpack on export")]
    #[test_case(RunState::Done, RunState::Failed, false ; "terminal")]
    #[test_case(RunState::Packaging, RunState::Failed, true ; "fail anywhere")]
    fn test_export_transitions(from: RunState, to: RunState, allowed: bool) {
        assert_eq!(from.can_transition_to(to, RunKind::Export), allowed);
    }

    #[test]
    fn test_import_path() {
        let mut tracker = RunTracker::new(RunKind::Import);
        for next in [
            RunState::ValidatingPath,
            RunState::Unpacking,
            RunState::Processing,
            RunState::Committing,
            RunState::Done,
        ] {
            tracker.advance(next).unwrap();
        }
        assert_eq!(tracker.state(), RunState::Done);
        assert_eq!(tracker.history().len(), 6);
    }

    #[test]
    fn test_illegal_transition_rejected() {
        let mut tracker = RunTracker::new(RunKind::Import);
        assert!(tracker.advance(RunState::Packaging).is_err());
        assert_eq!(tracker.state(), RunState::Init);
    }

    #[test]
    fn test_fail_is_sticky() {
        let mut tracker = RunTracker::new(RunKind::Export);
        tracker.advance(RunState::ValidatingPath).unwrap();
        tracker.fail();
        tracker.fail();
        assert_eq!(tracker.state(), RunState::Failed);
        assert_eq!(tracker.history().len(), 3);
        assert!(tracker.advance(RunState::Processing).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(RunState::ValidatingPath.to_string(), "VALIDATING_PATH");
        assert_eq!(RunKind::Export.to_string(), "export");
    }
}
