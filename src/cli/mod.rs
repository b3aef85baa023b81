//! Command-line surface for tickmove.

pub mod args;
pub mod commands;
