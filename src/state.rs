use std::sync::Arc;

use crate::config::Config;
use crate::store::{MemStorage, Storage};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn Storage>, config: Config) -> Self {
        Self { store, config }
    }

    /// Fresh in-memory store, seeded when the config asks for it.
    pub fn from_config(config: Config) -> Self {
        let store = if config.seed.enabled {
            MemStorage::seeded()
        } else {
            MemStorage::new()
        };
        Self::new(Arc::new(store), config)
    }
}
