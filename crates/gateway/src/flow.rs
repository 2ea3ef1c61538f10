//! Typed two-step account-link flow.
//!
//! Login is only reachable from a registered user, so the register-then-login
//! ordering is structural rather than a calling convention.

use crate::client::SnapTradeClient;
use crate::error::Result;
use crate::types::{ConnectionSession, UserCredential};

/// Entry point for linking a brokerage account.
pub struct AccountLink;

impl AccountLink {
    /// Step one: register the user and obtain a credential.
    pub async fn register(client: &SnapTradeClient, user_id: &str) -> Result<LinkedUser> {
        let credential = client.register_user(user_id).await?;
        Ok(LinkedUser { credential })
    }

    /// Resume a flow from a previously issued credential.
    pub fn resume(credential: UserCredential) -> LinkedUser {
        LinkedUser { credential }
    }
}

/// A user holding an issued credential; the only state from which a
/// connection-portal session can be opened.
pub struct LinkedUser {
    credential: UserCredential,
}

impl LinkedUser {
    pub fn credential(&self) -> &UserCredential {
        &self.credential
    }

    /// Step two: open a connection-portal session for this credential.
    pub async fn open_portal(
        &self,
        client: &SnapTradeClient,
        redirect_uri: &str,
    ) -> Result<ConnectionSession> {
        client
            .login_user(
                &self.credential.user_id,
                &self.credential.user_secret,
                redirect_uri,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_preserves_credential() {
        let linked = AccountLink::resume(UserCredential {
            user_id: "u1".to_string(),
            user_secret: "s1".to_string(),
        });
        assert_eq!(linked.credential().user_id, "u1");
        assert_eq!(linked.credential().user_secret, "s1");
    }
}
