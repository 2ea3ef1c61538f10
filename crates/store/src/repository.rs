//! Supabase-backed account store.
//!
//! Rows are written through PostgREST in a single batch upsert keyed on
//! `account_id`; conflicting rows are overwritten with the latest values.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

use crate::error::{Result, StoreError};
use crate::model::AccountRow;

/// Default timeout for store requests.
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const MAX_LOG_BODY_CHARS: usize = 512;
const ACCOUNTS_TABLE: &str = "snaptrade_accounts";
const CONFLICT_KEY: &str = "account_id";

/// Client for the hosted account store (Supabase PostgREST).
#[derive(Debug, Clone)]
pub struct AccountStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AccountStore {
    /// Create a new store client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The Supabase project URL (e.g., "https://xyz.supabase.co")
    /// * `api_key` - Service key used for both the `apikey` and bearer headers
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let key_value = HeaderValue::from_str(&self.api_key)
            .map_err(|_| StoreError::invalid_request("Invalid store API key format"))?;
        headers.insert("apikey", key_value);

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| StoreError::invalid_request("Invalid store API key format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        // Upsert semantics: conflicting keys are merged, not skipped.
        headers.insert(
            "prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=minimal"),
        );

        Ok(headers)
    }

    /// Upsert account rows in a single batch, keyed on `account_id`.
    ///
    /// Returns the number of rows submitted. An empty slice is a no-op.
    ///
    /// POST /rest/v1/snaptrade_accounts?on_conflict=account_id
    pub async fn upsert_accounts(&self, rows: &[AccountRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let url = format!("{}/rest/v1/{}", self.base_url, ACCOUNTS_TABLE);
        debug!("Upserting {} account rows", rows.len());

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .query(&[("on_conflict", CONFLICT_KEY)])
            .json(rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
            if body.chars().count() > MAX_LOG_BODY_CHARS {
                preview.push_str("...");
            }
            debug!("Store response error ({}): {}", status, preview);
            return Err(StoreError::api(
                status.as_u16(),
                format!("Upsert failed: {}", preview),
            ));
        }

        Ok(rows.len())
    }
}
