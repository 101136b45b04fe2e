//! Counter stores: file-backed (durable) and in-memory.
//!
//! A store owns the counter and serializes every load-increment-save cycle
//! behind one process-wide mutex. The lock is synchronous and is never held
//! across I/O other than the state file write itself, so an increment
//! completes near-instantly. Mutual exclusion is in-process only: two
//! processes sharing one state file can still race on the read-modify-write
//! and lose updates. Single-instance ownership of the file is assumed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Deserialize;

use crate::counter::Counter;
use crate::error::{Result, TallyError};

/// What happens when a save fails mid-increment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Durability {
    /// Log the failure and return the incremented value anyway. Matches the
    /// legacy behavior where durability loss is an accepted risk.
    #[default]
    Relaxed,
    /// Surface the failure to the caller as `TallyError::Storage`.
    Strict,
}

/// Read/increment/write contract shared by all counter stores.
///
/// Handlers receive a store as an injected `Arc<dyn CounterStore>` and never
/// touch the underlying storage directly.
pub trait CounterStore: Send + Sync {
    /// Current persisted value, or a zero-valued counter when no prior
    /// state exists or the stored bytes are unreadable. Malformed state is
    /// treated as absence, not as an error.
    fn load(&self) -> Counter;

    /// Durably overwrite the prior state with `counter`.
    fn save(&self, counter: &Counter) -> Result<()>;

    /// Atomically (with respect to in-process callers) load, add one visit,
    /// persist, and return the new total.
    fn increment_and_persist(&self) -> Result<u64>;
}

/// Durable store backed by a single JSON file.
pub struct FileStore {
    path: PathBuf,
    durability: Durability,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>, durability: Durability) -> Self {
        Self {
            path: path.into(),
            durability,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_state(&self, counter: &Counter) -> Result<()> {
        let data = serde_json::to_vec(counter)
            .map_err(|e| TallyError::Internal(format!("encode counter failed: {e}")))?;

        // Replace via temp file + rename so readers never observe a
        // partially written state file.
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &data).map_err(|e| {
            TallyError::Storage(format!("write {} failed: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            TallyError::Storage(format!("rename into {} failed: {e}", self.path.display()))
        })
    }
}

impl CounterStore for FileStore {
    fn load(&self) -> Counter {
        match fs::read(&self.path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e,
                    "state file unreadable, starting from zero");
                Counter::zero()
            }),
            // Missing file means no prior state.
            Err(_) => Counter::zero(),
        }
    }

    fn save(&self, counter: &Counter) -> Result<()> {
        self.write_state(counter)
    }

    fn increment_and_persist(&self) -> Result<u64> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let next = self.load().incremented();
        if let Err(e) = self.save(&next) {
            match self.durability {
                Durability::Strict => return Err(e),
                Durability::Relaxed => {
                    tracing::warn!(path = %self.path.display(), error = %e,
                        "counter save failed, durability lost for this visit");
                }
            }
        }
        Ok(next.visits)
    }
}

/// Non-durable store. State dies with the process.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<Counter>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryStore {
    fn load(&self) -> Counter {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save(&self, counter: &Counter) -> Result<()> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = *counter;
        Ok(())
    }

    fn increment_and_persist(&self) -> Result<u64> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = state.incremented();
        Ok(state.visits)
    }
}
