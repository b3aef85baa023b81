//! Command implementations for tickmove.

mod sync;

pub use sync::{sync, Services};
