//! SnapTrade gateway client for the account-linking proxy.
//!
//! This crate wraps the SnapTrade REST API: typed wire models, the HTTP
//! client, mock-fallback payload builders, and the typed register-then-login
//! flow.

pub mod client;
pub mod error;
pub mod flow;
pub mod mock;
pub mod types;

// Re-export commonly used types
pub use client::{Credentials, SnapTradeClient};
pub use error::{GatewayError, Result};
pub use flow::{AccountLink, LinkedUser};
pub use types::{Account, AccountBalance, BalanceTotal, ConnectionSession, UserCredential};
