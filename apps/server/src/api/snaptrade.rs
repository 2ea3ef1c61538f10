//! SnapTrade proxy endpoints: registration, login, account fetch, and the
//! stored-holdings placeholder.
//!
//! Register, login, and accounts never surface gateway failures to the
//! caller. A failed remote call is replaced by a mock payload of the same
//! shape, and every response carries a `source` tag ("live" or "fallback")
//! so callers and tests can still tell the paths apart.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use snaplink_gateway::{mock, Account, ConnectionSession, UserCredential};
use snaplink_store::AccountRow;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Provenance of a proxy response: produced by the live gateway or
/// synthesized locally after a gateway failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Live,
    Fallback,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub credential: UserCredential,
    pub source: ResponseSource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScopedRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_secret: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub session: ConnectionSession,
    pub source: ResponseSource,
}

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub success: bool,
    pub accounts: Vec<Account>,
    pub total: usize,
    pub active: usize,
    /// True iff the active accounts were actually written to the store.
    pub saved: bool,
    pub source: ResponseSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn require_field(value: &str, name: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!(
            "Missing required field: {}",
            name
        )));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────────────

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    require_field(&body.user_id, "userId")?;
    info!("[SnapTrade] Registering user: {}", body.user_id);

    match state.gateway.register_user(&body.user_id).await {
        Ok(credential) => {
            info!("[SnapTrade] Registration succeeded for {}", body.user_id);
            Ok(Json(RegisterResponse {
                credential,
                source: ResponseSource::Live,
            }))
        }
        Err(err) => {
            warn!(
                "[SnapTrade] Registration failed, substituting mock credential: {}",
                err
            );
            Ok(Json(RegisterResponse {
                credential: mock::credential(&body.user_id),
                source: ResponseSource::Fallback,
            }))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Login
// ─────────────────────────────────────────────────────────────────────────────

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UserScopedRequest>,
) -> ApiResult<Json<LoginResponse>> {
    require_field(&body.user_id, "userId")?;
    require_field(&body.user_secret, "userSecret")?;
    info!("[SnapTrade] Logging in user: {}", body.user_id);

    let redirect_uri = state.config.portal_redirect_uri.clone();
    match state
        .gateway
        .login_user(&body.user_id, &body.user_secret, &redirect_uri)
        .await
    {
        Ok(session) => {
            info!("[SnapTrade] Login succeeded for {}", body.user_id);
            Ok(Json(LoginResponse {
                session,
                source: ResponseSource::Live,
            }))
        }
        Err(err) => {
            warn!(
                "[SnapTrade] Login failed, substituting mock session: {}",
                err
            );
            Ok(Json(LoginResponse {
                session: mock::session(&body.user_id, &body.user_secret, &redirect_uri),
                source: ResponseSource::Fallback,
            }))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

async fn accounts(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UserScopedRequest>,
) -> ApiResult<Json<AccountsResponse>> {
    require_field(&body.user_id, "userId")?;
    require_field(&body.user_secret, "userSecret")?;
    info!("[SnapTrade] Fetching accounts for {}", body.user_id);

    let fetched = match state
        .gateway
        .list_accounts(&body.user_id, &body.user_secret)
        .await
    {
        Ok(accounts) => accounts,
        Err(err) => {
            warn!(
                "[SnapTrade] Accounts fetch failed, substituting mock account: {}",
                err
            );
            let accounts = vec![mock::account()];
            return Ok(Json(AccountsResponse {
                success: true,
                total: accounts.len(),
                active: accounts.len(),
                accounts,
                saved: false,
                source: ResponseSource::Fallback,
                note: Some("Using mock data due to API error".to_string()),
            }));
        }
    };

    let total = fetched.len();
    let active_accounts: Vec<Account> = fetched.into_iter().filter(Account::is_active).collect();
    let active = active_accounts.len();
    info!(
        "[SnapTrade] {} of {} fetched accounts are active",
        active, total
    );

    // Inactive accounts are never written; persistence failures are logged
    // and reflected only in `saved`.
    let saved = if active_accounts.is_empty() {
        false
    } else {
        let rows: Vec<AccountRow> = active_accounts
            .iter()
            .map(|account| AccountRow::from_account(&body.user_id, account))
            .collect();
        match state.store.upsert_accounts(&rows).await {
            Ok(written) => {
                info!("[SnapTrade] Upserted {} account rows", written);
                true
            }
            Err(err) => {
                error!("[SnapTrade] Failed to persist accounts: {}", err);
                false
            }
        }
    };

    Ok(Json(AccountsResponse {
        success: true,
        accounts: active_accounts,
        total,
        active,
        saved,
        source: ResponseSource::Live,
        note: None,
    }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Stored Holdings (placeholder)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StoredHoldingsResponse {
    pub success: bool,
    pub message: String,
    pub summary: HoldingsSummary,
    pub portfolios: Vec<StoredPortfolio>,
    pub note: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HoldingsSummary {
    pub total_accounts: usize,
    pub total_value: Decimal,
    pub total_unrealized_gain: Decimal,
    pub total_positions: usize,
    pub total_orders: usize,
    pub currencies: Vec<&'static str>,
    pub account_types: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct StoredPortfolio {
    pub id: &'static str,
    pub user_id: &'static str,
    pub account_id: &'static str,
    pub account_name: &'static str,
    pub account_type: &'static str,
    pub total_value: Decimal,
    pub total_unrealized_gain: Decimal,
    pub currency: &'static str,
    pub balance_amount: Decimal,
    pub balance_currency: &'static str,
    pub cash_available: Decimal,
    pub positions: Vec<StoredPosition>,
    pub last_updated: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StoredPosition {
    pub symbol: &'static str,
    pub quantity: u32,
    pub price: Decimal,
    pub open_pnl: Decimal,
}

fn sample_positions() -> Vec<StoredPosition> {
    vec![
        StoredPosition {
            symbol: "AAPL",
            quantity: 10,
            price: Decimal::new(150_25, 2),
            open_pnl: Decimal::new(250, 0),
        },
        StoredPosition {
            symbol: "GOOGL",
            quantity: 5,
            price: Decimal::new(2_800_75, 2),
            open_pnl: Decimal::new(-150, 0),
        },
    ]
}

fn sample_portfolio(
    id: &'static str,
    account_id: &'static str,
    account_name: &'static str,
    account_type: &'static str,
) -> StoredPortfolio {
    StoredPortfolio {
        id,
        user_id: "demo@example.com",
        account_id,
        account_name,
        account_type,
        total_value: Decimal::new(10_000_50, 2),
        total_unrealized_gain: Decimal::new(100, 0),
        currency: "USD",
        balance_amount: Decimal::new(10_000_50, 2),
        balance_currency: "USD",
        cash_available: Decimal::new(1_500_25, 2),
        positions: sample_positions(),
        last_updated: "2025-08-31T18:34:05Z",
    }
}

/// Placeholder for a future store-backed holdings query; the payload is a
/// constant response, internally consistent across summary and portfolios.
async fn stored_holdings() -> Json<StoredHoldingsResponse> {
    info!("[SnapTrade] Serving stored holdings placeholder");

    let portfolios = vec![
        sample_portfolio(
            "78c985a5-085b-4363-8f26-9c11e3d1f370",
            "e440509d-5e52-4410-ac6c-d32074149bc5",
            "Wealthsimple Trade PERSONAL",
            "PERSONAL",
        ),
        sample_portfolio(
            "0b71f763-a844-4fd3-ac51-402f7e5d115b",
            "b0eab677-1ae9-4426-a91e-ea0f68914e25",
            "Wealthsimple Trade RRSP",
            "RRSP",
        ),
    ];

    let summary = HoldingsSummary {
        total_accounts: portfolios.len(),
        total_value: portfolios.iter().map(|p| p.total_value).sum(),
        total_unrealized_gain: portfolios.iter().map(|p| p.total_unrealized_gain).sum(),
        total_positions: portfolios.iter().map(|p| p.positions.len()).sum(),
        total_orders: 0,
        currencies: vec!["USD"],
        account_types: portfolios.iter().map(|p| p.account_type).collect(),
    };

    Json(StoredHoldingsResponse {
        success: true,
        message: format!("Retrieved {} portfolios from database", portfolios.len()),
        summary,
        portfolios,
        note: "Data retrieved from stored portfolios placeholder",
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/accounts", post(accounts))
        .route("/holdings/stored", get(stored_holdings))
}
