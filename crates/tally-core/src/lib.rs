//! tally core: the counter entity, its stores, and the shared error surface.
//!
//! This crate owns the visit counter and every way it is persisted. It
//! intentionally carries no HTTP or runtime dependencies so the stores can
//! be exercised directly in tests and reused behind any server frontend.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `TallyError`/`Result` so a running
//! service does not crash on a bad disk or a corrupt state file.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod counter;
pub mod error;
pub mod store;

pub use counter::Counter;
/// Shared result type.
pub use error::{Result, TallyError};
pub use store::{CounterStore, Durability, FileStore, MemoryStore};
