//! Persistence row model for brokerage accounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snaplink_gateway::Account;

/// Flattened account row as stored in the `snaptrade_accounts` table,
/// keyed by `account_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRow {
    pub user_id: String,
    pub account_id: String,
    pub brokerage_authorization: Option<String>,
    pub name: Option<String>,
    pub number: Option<String>,
    pub institution_name: Option<String>,
    pub status: Option<String>,
    pub raw_type: Option<String>,
    pub created_date: Option<String>,
    pub balance_amount: Option<Decimal>,
    pub balance_currency: Option<String>,
    pub sync_status: Option<Value>,
    pub meta: Option<Value>,
    pub portfolio_group: Option<String>,
    pub cash_restrictions: Option<Value>,
}

impl AccountRow {
    /// Flatten a gateway account into its persistence row for `user_id`.
    pub fn from_account(user_id: &str, account: &Account) -> Self {
        let total = account.balance.as_ref().and_then(|b| b.total.as_ref());
        Self {
            user_id: user_id.to_string(),
            account_id: account.id.clone(),
            brokerage_authorization: account.brokerage_authorization.clone(),
            name: account.name.clone(),
            number: account.number.clone(),
            institution_name: account.institution_name.clone(),
            status: account.status.clone(),
            raw_type: account.raw_type.clone(),
            created_date: account.created_date.clone(),
            balance_amount: total.and_then(|t| t.amount),
            balance_currency: total.and_then(|t| t.currency.clone()),
            sync_status: account.sync_status.clone(),
            meta: account.meta.clone(),
            portfolio_group: account.portfolio_group.clone(),
            cash_restrictions: account.cash_restrictions.clone(),
        }
    }
}
