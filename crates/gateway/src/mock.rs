//! Mock fallback payloads substituted when a SnapTrade call fails.
//!
//! Each builder returns the same top-level shape as the live response it
//! replaces, so consumers written against the live schema need no branching
//! on which path produced the data.

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;

use crate::types::{Account, AccountBalance, BalanceTotal, ConnectionSession, UserCredential};

const SECRET_SUFFIX_LEN: usize = 9;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Path appended to the portal base for the mock connection portal.
pub const MOCK_PORTAL_PATH: &str = "mock-connection-portal";

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}

/// Substitute credential for a failed registration.
///
/// The secret is `mock-secret-<unix-millis>-<9 chars of [a-z0-9]>`.
pub fn credential(user_id: &str) -> UserCredential {
    UserCredential {
        user_id: user_id.to_string(),
        user_secret: format!(
            "mock-secret-{}-{}",
            Utc::now().timestamp_millis(),
            random_suffix()
        ),
    }
}

/// Substitute login session pointing at the mock connection portal.
pub fn session(user_id: &str, user_secret: &str, portal_base: &str) -> ConnectionSession {
    ConnectionSession {
        redirect_uri: format!(
            "{}/{}",
            portal_base.trim_end_matches('/'),
            MOCK_PORTAL_PATH
        ),
        token: Some(format!("mock-token-{}", Utc::now().timestamp_millis())),
        session_id: None,
        user_id: user_id.to_string(),
        user_secret: user_secret.to_string(),
    }
}

/// Substitute listing for a failed accounts fetch: one active account.
pub fn account() -> Account {
    Account {
        id: "real-account-1".to_string(),
        brokerage_authorization: None,
        name: Some("Real Investment Account".to_string()),
        number: Some("123456789".to_string()),
        institution_name: Some("Real Brokerage".to_string()),
        status: Some("active".to_string()),
        raw_type: Some("investment".to_string()),
        created_date: Some(Utc::now().to_rfc3339()),
        balance: Some(AccountBalance {
            total: Some(BalanceTotal {
                amount: Some(Decimal::new(15_000_50, 2)),
                currency: Some("USD".to_string()),
            }),
        }),
        sync_status: None,
        meta: None,
        portfolio_group: None,
        cash_restrictions: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_secret_matches_documented_pattern() {
        let credential = credential("u1");
        assert_eq!(credential.user_id, "u1");

        let mut parts = credential.user_secret.splitn(4, '-');
        assert_eq!(parts.next(), Some("mock"));
        assert_eq!(parts.next(), Some("secret"));
        let millis = parts.next().expect("timestamp part");
        assert!(!millis.is_empty() && millis.bytes().all(|b| b.is_ascii_digit()));
        let suffix = parts.next().expect("random part");
        assert_eq!(suffix.len(), SECRET_SUFFIX_LEN);
        assert!(suffix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }

    #[test]
    fn mock_session_targets_portal_under_base() {
        let session = session("u1", "s1", "http://localhost:9001/");
        assert_eq!(
            session.redirect_uri,
            "http://localhost:9001/mock-connection-portal"
        );
        assert!(session
            .token
            .as_deref()
            .expect("token")
            .starts_with("mock-token-"));
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.user_secret, "s1");
    }

    #[test]
    fn mock_account_is_active_with_usd_balance() {
        let account = account();
        assert!(account.is_active());
        let total = account.balance.as_ref().and_then(|b| b.total.as_ref());
        assert_eq!(
            total.and_then(|t| t.amount),
            Some(Decimal::new(15_000_50, 2))
        );
        assert_eq!(total.and_then(|t| t.currency.as_deref()), Some("USD"));
    }
}
