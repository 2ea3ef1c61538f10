//! Server configuration, read once at startup.

use std::net::SocketAddr;

const DEFAULT_SNAPTRADE_API_URL: &str = "https://api.snaptrade.com";
const DEFAULT_SNAPTRADE_CLIENT_ID: &str = "MY-ORG-TEST";
const DEFAULT_SNAPTRADE_CONSUMER_KEY: &str = "local-dev-consumer-key";
const DEFAULT_SUPABASE_URL: &str = "http://localhost:54321";
const DEFAULT_SUPABASE_SERVICE_KEY: &str = "local-dev-service-key";
const DEFAULT_PORTAL_REDIRECT_URI: &str = "http://localhost:9001/";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:9001,http://localhost:9002";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3002";

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Immutable configuration handed to every handler through `AppState`.
/// Never read from ambient environment state after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub snaptrade_api_url: String,
    pub snaptrade_client_id: String,
    pub snaptrade_consumer_key: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    /// Callback URL handed to the gateway at login; also the base the mock
    /// connection portal hangs off.
    pub portal_redirect_uri: String,
    pub cors_origins: Vec<String>,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Read configuration from the environment. Defaults exist for local
    /// development only.
    pub fn from_env() -> Self {
        let listen_addr = env_or("LISTEN_ADDR", DEFAULT_LISTEN_ADDR)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 3002)));

        let cors_origins = env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            snaptrade_api_url: env_or("SNAPTRADE_API_URL", DEFAULT_SNAPTRADE_API_URL)
                .trim_end_matches('/')
                .to_string(),
            snaptrade_client_id: env_or("SNAPTRADE_CLIENT_ID", DEFAULT_SNAPTRADE_CLIENT_ID),
            snaptrade_consumer_key: env_or(
                "SNAPTRADE_CONSUMER_KEY",
                DEFAULT_SNAPTRADE_CONSUMER_KEY,
            ),
            supabase_url: env_or("SUPABASE_URL", DEFAULT_SUPABASE_URL)
                .trim_end_matches('/')
                .to_string(),
            supabase_service_key: env_or("SUPABASE_SERVICE_KEY", DEFAULT_SUPABASE_SERVICE_KEY),
            portal_redirect_uri: env_or("PORTAL_REDIRECT_URI", DEFAULT_PORTAL_REDIRECT_URI),
            cors_origins,
            listen_addr,
        }
    }
}
