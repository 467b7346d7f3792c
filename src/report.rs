use crate::Timestamp;
use std::time::Duration;

/// Totals accumulated over a run and handed to
/// [`Collaborator::finalize`](crate::Collaborator::finalize).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Column page × row page blocks processed, summed over column rounds.
    pub blocks: u64,
    /// Distinct column ids seen.
    pub columns: u64,
    /// The row count reported by the data source.
    pub rows: u64,
    /// Number of non-empty column pages.
    pub column_rounds: u64,
}

impl RunStats {
    pub(crate) fn new(rows: u64) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Accounts for one finished column round.
    pub(crate) fn record_round(&mut self, columns: usize, row_rounds: u64) {
        self.column_rounds += 1;
        self.columns += columns as u64;
        self.blocks += row_rounds;
    }
}

/// Result of [`Engine::run`](crate::Engine::run).
#[derive(Debug, Clone, PartialEq)]
pub struct Report<R> {
    /// Whatever the sink returned from `finalize`.
    pub summary: R,
    pub blocks: u64,
    pub columns: u64,
    pub rows: u64,
    /// The permutation seed, so that a run can be reproduced.
    pub random: u64,
    pub duration: Duration,
    pub timestamp: Timestamp,
}

impl<R> Report<R> {
    pub(crate) fn new(
        summary: R,
        stats: RunStats,
        random: u64,
        timestamp: Timestamp,
        duration: Duration,
    ) -> Self {
        Self {
            summary,
            blocks: stats.blocks,
            columns: stats.columns,
            rows: stats.rows,
            random,
            duration,
            timestamp,
        }
    }

    /// Replaces the summary, keeping the run totals.
    pub fn map<S>(self, f: impl FnOnce(R) -> S) -> Report<S> {
        Report {
            summary: f(self.summary),
            blocks: self.blocks,
            columns: self.columns,
            rows: self.rows,
            random: self.random,
            duration: self.duration,
            timestamp: self.timestamp,
        }
    }
}
