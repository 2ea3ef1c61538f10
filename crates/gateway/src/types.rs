//! Wire types for the SnapTrade API.
//!
//! Auth payloads use camelCase field names; account records come back in
//! snake_case, matching what SnapTrade serializes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Credential issued by SnapTrade user registration.
///
/// Immutable once issued; authenticates every subsequent call for that user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredential {
    pub user_id: String,
    pub user_secret: String,
}

/// Session produced by login. Ephemeral; drives the user through the
/// external connection portal exactly once and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSession {
    #[serde(rename = "redirectURI", alias = "redirectUri")]
    pub redirect_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_secret: String,
}

/// Brokerage account record from the SnapTrade accounts listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brokerage_authorization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<AccountBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_restrictions: Option<Value>,
}

impl Account {
    /// Only open or active accounts are eligible for persistence.
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_deref(), Some("open") | Some("active"))
    }
}

/// Balance block nested inside an account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBalance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<BalanceTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceTotal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Error body returned by the SnapTrade API on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with_status(status: Option<&str>) -> Account {
        serde_json::from_value(serde_json::json!({
            "id": "acct-1",
            "status": status,
        }))
        .expect("account json")
    }

    #[test]
    fn open_and_active_accounts_are_active() {
        assert!(account_with_status(Some("open")).is_active());
        assert!(account_with_status(Some("active")).is_active());
    }

    #[test]
    fn other_statuses_are_inactive() {
        assert!(!account_with_status(Some("closed")).is_active());
        assert!(!account_with_status(Some("ACTIVE")).is_active());
        assert!(!account_with_status(None).is_active());
    }

    #[test]
    fn account_deserializes_from_snaptrade_shape() {
        let account: Account = serde_json::from_str(
            r#"{
                "id": "e440509d-5e52-4410-ac6c-d32074149bc5",
                "brokerage_authorization": "auth-1",
                "name": "Wealthsimple Trade PERSONAL",
                "number": "123456789",
                "institution_name": "Wealthsimple",
                "status": "open",
                "raw_type": "investment",
                "created_date": "2025-08-31T18:34:05Z",
                "balance": { "total": { "amount": 10000.5, "currency": "USD" } },
                "meta": { "type": "PERSONAL" },
                "cash_restrictions": []
            }"#,
        )
        .expect("account json");

        assert!(account.is_active());
        let total = account.balance.as_ref().and_then(|b| b.total.as_ref());
        assert_eq!(
            total.and_then(|t| t.amount),
            Some(Decimal::new(100005, 1))
        );
        assert_eq!(
            total.and_then(|t| t.currency.as_deref()),
            Some("USD")
        );
    }

    #[test]
    fn session_accepts_both_redirect_spellings() {
        let upper: ConnectionSession =
            serde_json::from_str(r#"{"redirectURI": "https://portal/a"}"#).expect("session");
        let lower: ConnectionSession =
            serde_json::from_str(r#"{"redirectUri": "https://portal/b"}"#).expect("session");
        assert_eq!(upper.redirect_uri, "https://portal/a");
        assert_eq!(lower.redirect_uri, "https://portal/b");
    }

    #[test]
    fn credential_round_trips_camel_case() {
        let credential = UserCredential {
            user_id: "u1".to_string(),
            user_secret: "s1".to_string(),
        };
        let value = serde_json::to_value(&credential).expect("serialize");
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["userSecret"], "s1");
    }
}
