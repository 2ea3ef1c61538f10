//! Shared application state and startup wiring.

use std::sync::Arc;

use snaplink_gateway::{Credentials, SnapTradeClient};
use snaplink_store::AccountStore;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Read-only state shared by every request handler.
pub struct AppState {
    pub config: Config,
    pub gateway: SnapTradeClient,
    pub store: AccountStore,
}

/// Initialize the tracing subscriber. `RUST_LOG` controls filtering.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Build shared state from configuration.
pub fn build_state(config: &Config) -> Arc<AppState> {
    let gateway = SnapTradeClient::new(
        &config.snaptrade_api_url,
        Credentials {
            client_id: config.snaptrade_client_id.clone(),
            consumer_key: config.snaptrade_consumer_key.clone(),
        },
    );
    let store = AccountStore::new(&config.supabase_url, &config.supabase_service_key);

    Arc::new(AppState {
        config: config.clone(),
        gateway,
        store,
    })
}
