//! SnapTrade account-linking proxy server.
//!
//! Mediates between a browser client and the SnapTrade API: registration,
//! login, and account fetch with mock fallback, plus persistence of active
//! accounts into the hosted store.

pub mod api;
pub mod config;
pub mod error;
pub mod main_lib;
