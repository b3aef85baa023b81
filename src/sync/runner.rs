//! The polling loop.
//!
//! One cycle refreshes the store, moves ticked items for every list set in
//! configuration order, writes the snapshot if anything changed, then the
//! loop sleeps. Network failures are logged and the next cycle tries again;
//! anything else ends the loop.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use super::mover::{MoveReport, ResolvedSet};
use crate::config::{Configuration, ListSet};
use crate::error::MoverError;
use crate::output;
use crate::snapshot;
use crate::store::NoteStore;

/// Upper bound on the final flush at shutdown.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the loop is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting for the next cycle.
    Idle,
    /// Refreshing remote state.
    Syncing,
    /// Applying moves.
    Moving,
}

/// Result of a single cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The refresh failed with a retryable error.
    RefreshFailed(String),
    /// Nothing was ticked.
    Unchanged,
    /// At least one list set had ticked items.
    Moved(Vec<MoveReport>),
}

impl CycleOutcome {
    /// Number of items moved this cycle.
    #[must_use]
    pub fn moved(&self) -> usize {
        match self {
            Self::Moved(reports) => reports.iter().map(|r| r.moved.len()).sum(),
            Self::RefreshFailed(_) | Self::Unchanged => 0,
        }
    }
}

/// Why [`Runner::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    CycleLimit,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: usize,
    pub moved: usize,
    pub reason: StopReason,
}

/// Settings for the loop.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub list_sets: Vec<ListSet>,
    pub interval: Duration,
    pub purge_primary_checked: bool,
    /// Where to write the snapshot; `None` disables it.
    pub snapshot_file: Option<PathBuf>,
    /// Stop after this many cycles; `None` runs until interrupted.
    pub max_cycles: Option<usize>,
}

impl RunnerOptions {
    #[must_use]
    pub fn from_config(config: &Configuration, snapshot_file: Option<PathBuf>) -> Self {
        Self {
            list_sets: config.list_sets.clone(),
            interval: config.poll_interval,
            purge_primary_checked: config.purge_primary_checked,
            snapshot_file,
            max_cycles: None,
        }
    }
}

/// Drives a [`NoteStore`] through repeated cycles.
pub struct Runner<S> {
    store: S,
    options: RunnerOptions,
    state: SyncState,
}

impl<S: NoteStore> Runner<S> {
    #[must_use]
    pub const fn new(store: S, options: RunnerOptions) -> Self {
        Self {
            store,
            options,
            state: SyncState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SyncState {
        self.state
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Run one cycle.
    ///
    /// # Errors
    ///
    /// Returns any non-transient error from the store, or a validation error
    /// if a configured list has disappeared.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, MoverError> {
        self.state = SyncState::Syncing;
        if let Err(e) = self.store.refresh().await {
            self.state = SyncState::Idle;
            if e.is_transient() {
                tracing::warn!(error = %e, "refresh failed, retrying next cycle");
                return Ok(CycleOutcome::RefreshFailed(e.to_string()));
            }
            return Err(e);
        }

        let purge = self.options.purge_primary_checked;
        let mut resolved = Vec::with_capacity(self.options.list_sets.len());
        for (index, list_set) in self.options.list_sets.iter().enumerate() {
            match ResolvedSet::resolve(&self.store, index + 1, list_set) {
                Ok(set) => resolved.push(set),
                Err(e) => {
                    self.state = SyncState::Idle;
                    return Err(e);
                },
            }
        }

        if !resolved.iter().any(|set| set.has_work(&self.store, purge)) {
            self.state = SyncState::Idle;
            return Ok(CycleOutcome::Unchanged);
        }

        self.state = SyncState::Moving;
        let result = self.apply_all(&resolved, purge);
        self.state = SyncState::Idle;
        let reports = result?;

        if reports.iter().any(|r| !r.is_empty()) {
            self.write_snapshot();
        }
        Ok(CycleOutcome::Moved(reports))
    }

    fn apply_all(
        &mut self,
        resolved: &[ResolvedSet],
        purge: bool,
    ) -> Result<Vec<MoveReport>, MoverError> {
        let mut reports = Vec::with_capacity(resolved.len());
        for set in resolved {
            let report = set.apply(&mut self.store, purge)?;
            if !report.moved.is_empty() {
                tracing::info!(
                    moved = report.moved.len(),
                    from = %report.secondary,
                    to = %report.primary,
                    "moved ticked items"
                );
            }
            reports.push(report);
        }
        Ok(reports)
    }

    fn write_snapshot(&self) {
        let Some(path) = &self.options.snapshot_file else {
            return;
        };
        let result = self
            .store
            .serialize_state()
            .and_then(|bytes| snapshot::write(path, &bytes));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "could not write snapshot");
        }
    }

    /// Cycle until `shutdown` resolves or the cycle limit is reached, then
    /// push pending changes one last time.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error from a cycle.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<RunSummary, MoverError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut cycles = 0;
        let mut moved = 0;

        let reason = loop {
            let outcome = tokio::select! {
                biased;
                () = &mut shutdown => break StopReason::Interrupted,
                outcome = self.run_cycle() => outcome?,
            };
            cycles += 1;
            moved += outcome.moved();
            output::print_cycle(&outcome);

            if self.options.max_cycles.is_some_and(|max| cycles >= max) {
                break StopReason::CycleLimit;
            }

            tokio::select! {
                biased;
                () = &mut shutdown => break StopReason::Interrupted,
                () = tokio::time::sleep(self.options.interval) => {},
            }
        };

        self.state = SyncState::Idle;
        self.flush().await;
        Ok(RunSummary {
            cycles,
            moved,
            reason,
        })
    }

    /// Best-effort refresh so local changes reach the service before exit.
    async fn flush(&mut self) {
        match tokio::time::timeout(FLUSH_TIMEOUT, self.store.refresh()).await {
            Ok(Ok(())) => tracing::debug!("pending changes flushed"),
            Ok(Err(e)) => tracing::warn!(error = %e, "final sync failed"),
            Err(_) => tracing::warn!("final sync timed out"),
        }
    }
}
