//! Shared application state for the tally server.
//!
//! The counter store is an injected trait object rather than a module-level
//! singleton, so tests can run several independent instances in one process.

use std::sync::Arc;

use tally_core::store::{CounterStore, FileStore, MemoryStore};

use crate::config::{Persistence, ServiceConfig};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServiceConfig,
    store: Arc<dyn CounterStore>,
}

impl AppState {
    /// Build application state with the store selected by the config.
    pub fn new(cfg: ServiceConfig) -> Self {
        let store: Arc<dyn CounterStore> = match cfg.counter.persistence {
            Persistence::File => Arc::new(FileStore::new(
                cfg.counter.path.clone(),
                cfg.counter.durability,
            )),
            Persistence::Memory => Arc::new(MemoryStore::new()),
        };
        Self::with_store(cfg, store)
    }

    /// Build application state around an externally constructed store.
    pub fn with_store(cfg: ServiceConfig, store: Arc<dyn CounterStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, store }),
        }
    }

    pub fn cfg(&self) -> &ServiceConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> &dyn CounterStore {
        self.inner.store.as_ref()
    }
}
