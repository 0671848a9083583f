//! Shared application state.

use marketdesk_core::{AppConfig, BseProvider, MarketSource, NseProvider};
use marketdesk_store::{PasswordHasher, Store, StoreResult};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub nse: Arc<dyn MarketSource>,
    pub bse: Arc<dyn MarketSource>,
}

impl AppState {
    pub fn new(store: Store, nse: Arc<dyn MarketSource>, bse: Arc<dyn MarketSource>) -> Self {
        Self {
            store: Arc::new(store),
            nse,
            bse,
        }
    }

    /// Open the store and build both live providers from configuration.
    pub fn from_config(config: &AppConfig) -> StoreResult<Self> {
        let hasher = PasswordHasher::new(config.server.bcrypt_cost)?;
        let store = Store::open(&config.server.data_dir, hasher)?;
        Ok(Self::new(
            store,
            Arc::new(NseProvider::new(config.market.nse.clone())),
            Arc::new(BseProvider::new(config.market.bse.clone())),
        ))
    }
}
