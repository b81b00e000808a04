//! Execution history
//!
//! The append-only record of completed cycles for the current
//! goal-processing session, with a bounded recent-window view for
//! prompt context.

use crate::core::Cycle;

/// Ordered sequence of recorded cycles.
///
/// Reset once at the start of each `process` call; grows monotonically
/// for the rest of the session. Nothing is persisted across runs.
#[derive(Debug, Default)]
pub struct ExecutionHistory {
    cycles: Vec<Cycle>,
}

impl ExecutionHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self { cycles: Vec::new() }
    }

    /// Discard all recorded cycles
    pub fn reset(&mut self) {
        self.cycles.clear();
    }

    /// Append a cycle. Iteration indices must arrive as 1, 2, 3, ...
    pub fn record(&mut self, cycle: Cycle) {
        debug_assert_eq!(cycle.iteration, self.cycles.len() + 1);
        self.cycles.push(cycle);
    }

    /// All recorded cycles, oldest first
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// The last `n` cycles (or fewer). The window trims the prompt
    /// context only; storage is never truncated.
    pub fn recent(&self, n: usize) -> &[Cycle] {
        let start = self.cycles.len().saturating_sub(n);
        &self.cycles[start..]
    }

    /// The most recently recorded cycle
    pub fn last(&self) -> Option<&Cycle> {
        self.cycles.last()
    }

    /// Number of recorded cycles
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }
}
