//! Moving ticked items between list sets.
//!
//! - `mover` handles one list set within a cycle
//! - `runner` drives the refresh/move/sleep loop

pub mod mover;
pub mod runner;

pub use mover::{MoveReport, ResolvedSet};
pub use runner::{CycleOutcome, RunSummary, Runner, RunnerOptions, StopReason, SyncState};
