//! tickmove - move ticked items from low priority Google Keep lists
//!
//! Watches pairs of checklists in Google Keep. Items ticked on a "low
//! priority" list are removed from it and re-added, unticked, at the top of
//! the matching primary list.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod secrets;
pub mod snapshot;
pub mod store;
pub mod sync;

pub use cli::args::Cli;
pub use config::Configuration;
pub use error::MoverError;
pub use store::{KeepConnector, NoteStore};
