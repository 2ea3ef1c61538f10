//! SnapTrade API client used by the proxy service.
//!
//! Partner identity rides along as `clientId`/`timestamp` query parameters
//! with the consumer key in a request header; user identity is the
//! `userId`/`userSecret` pair issued at registration.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;

use crate::error::{GatewayError, Result};
use crate::types::{Account, ApiErrorBody, ConnectionSession, UserCredential};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;
const CONSUMER_KEY_HEADER: &str = "x-snaptrade-consumer-key";

/// Partner credentials issued with the SnapTrade API subscription.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub consumer_key: String,
}

/// Client for the SnapTrade REST API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct SnapTradeClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl SnapTradeClient {
    /// Create a new gateway client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the SnapTrade API (e.g., "https://api.snaptrade.com")
    /// * `credentials` - Partner client id and consumer key
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Create headers for an API request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let key_value = HeaderValue::from_str(&self.credentials.consumer_key)
            .map_err(|_| GatewayError::invalid_request("Invalid consumer key format"))?;
        headers.insert(CONSUMER_KEY_HEADER, key_value);

        Ok(headers)
    }

    /// Partner identity query parameters attached to every request.
    fn partner_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("clientId", self.credentials.client_id.clone()),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
        ]
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = serde_json::from_str::<ApiErrorBody>(&body) {
                if let Some(detail) = error.detail {
                    let code = error
                        .code
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    return Err(GatewayError::api(
                        status.as_u16(),
                        format!("{}: {}", code, detail),
                    ));
                }
            }
            return Err(GatewayError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            GatewayError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// Register a user and obtain the secret that authenticates all
    /// subsequent calls for that user.
    ///
    /// POST /api/v1/snapTrade/registerUser
    pub async fn register_user(&self, user_id: &str) -> Result<UserCredential> {
        let url = format!("{}/api/v1/snapTrade/registerUser", self.base_url);
        debug!("Registering SnapTrade user: {}", user_id);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .query(&self.partner_query())
            .json(&serde_json::json!({ "userId": user_id }))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Log a user in and obtain a connection-portal session.
    ///
    /// The returned session is keyed back to the credential that produced it,
    /// whatever subset of user fields the API echoes.
    ///
    /// POST /api/v1/snapTrade/login
    pub async fn login_user(
        &self,
        user_id: &str,
        user_secret: &str,
        redirect_uri: &str,
    ) -> Result<ConnectionSession> {
        let url = format!("{}/api/v1/snapTrade/login", self.base_url);
        debug!("Logging in SnapTrade user: {}", user_id);

        let mut query = self.partner_query();
        query.push(("userId", user_id.to_string()));
        query.push(("userSecret", user_secret.to_string()));

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .query(&query)
            .json(&serde_json::json!({ "redirectURI": redirect_uri }))
            .send()
            .await?;

        let mut session: ConnectionSession = Self::parse_response(response).await?;
        session.user_id = user_id.to_string();
        session.user_secret = user_secret.to_string();
        Ok(session)
    }

    /// List the user's brokerage accounts.
    ///
    /// GET /api/v1/accounts
    pub async fn list_accounts(&self, user_id: &str, user_secret: &str) -> Result<Vec<Account>> {
        let url = format!("{}/api/v1/accounts", self.base_url);
        debug!("Listing accounts for SnapTrade user: {}", user_id);

        let mut query = self.partner_query();
        query.push(("userId", user_id.to_string()));
        query.push(("userSecret", user_secret.to_string()));

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&query)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex as TokioMutex;

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        target: String,
        consumer_key: Option<String>,
        body: String,
    }

    fn header_end_offset(buffer: &[u8]) -> Option<usize> {
        buffer.windows(4).position(|window| window == b"\r\n\r\n")
    }

    async fn read_http_request(
        stream: &mut tokio::net::TcpStream,
    ) -> Option<(String, HashMap<String, String>, String)> {
        let mut buffer = Vec::new();
        loop {
            let mut chunk = [0_u8; 2048];
            let read = stream.read(&mut chunk).await.ok()?;
            if read == 0 {
                return None;
            }
            buffer.extend_from_slice(&chunk[..read]);
            if header_end_offset(&buffer).is_some() {
                break;
            }
        }

        let header_end = header_end_offset(&buffer)?;
        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let mut lines = head.lines();
        let request_line = lines.next()?.to_string();

        let mut headers = HashMap::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        let content_length = headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);

        let mut body = buffer[header_end + 4..].to_vec();
        while body.len() < content_length {
            let mut chunk = [0_u8; 2048];
            let read = stream.read(&mut chunk).await.ok()?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
        }

        let target = request_line
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .to_string();
        Some((target, headers, String::from_utf8_lossy(&body).to_string()))
    }

    async fn write_http_response(
        stream: &mut tokio::net::TcpStream,
        status: u16,
        body: &str,
    ) -> std::io::Result<()> {
        let reason = match status {
            200 => "OK",
            400 => "Bad Request",
            401 => "Unauthorized",
            500 => "Internal Server Error",
            _ => "Error",
        };
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await?;
        stream.flush().await
    }

    async fn start_mock_server(
        responses: Vec<(u16, String)>,
    ) -> (
        String,
        Arc<TokioMutex<Vec<CapturedRequest>>>,
        tokio::task::JoinHandle<()>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let captured = Arc::new(TokioMutex::new(Vec::<CapturedRequest>::new()));
        let scripted = Arc::new(TokioMutex::new(VecDeque::from(responses)));
        let captured_clone = Arc::clone(&captured);
        let scripted_clone = Arc::clone(&scripted);

        let handle = tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(value) => value,
                    Err(_) => break,
                };
                let Some((target, headers, body)) = read_http_request(&mut stream).await else {
                    continue;
                };
                captured_clone.lock().await.push(CapturedRequest {
                    target,
                    consumer_key: headers.get(CONSUMER_KEY_HEADER).cloned(),
                    body,
                });
                let (status, response_body) = scripted_clone
                    .lock()
                    .await
                    .pop_front()
                    .unwrap_or((500, r#"{"detail":"unexpected request"}"#.to_string()));
                let _ = write_http_response(&mut stream, status, &response_body).await;
            }
        });

        (format!("http://{}", addr), captured, handle)
    }

    fn test_credentials() -> Credentials {
        Credentials {
            client_id: "TEST-CLIENT".to_string(),
            consumer_key: "test-consumer-key".to_string(),
        }
    }

    #[tokio::test]
    async fn register_user_parses_credential_and_sends_partner_identity() {
        let (base_url, captured, server) = start_mock_server(vec![(
            200,
            r#"{"userId":"u1","userSecret":"issued-secret"}"#.to_string(),
        )])
        .await;

        let client = SnapTradeClient::new(&base_url, test_credentials());
        let credential = client.register_user("u1").await.expect("register");
        assert_eq!(credential.user_id, "u1");
        assert_eq!(credential.user_secret, "issued-secret");

        let requests = captured.lock().await.clone();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].target.starts_with("/api/v1/snapTrade/registerUser?"));
        assert!(requests[0].target.contains("clientId=TEST-CLIENT"));
        assert!(requests[0].target.contains("timestamp="));
        assert_eq!(
            requests[0].consumer_key.as_deref(),
            Some("test-consumer-key")
        );
        assert!(requests[0].body.contains(r#""userId":"u1""#));

        server.abort();
    }

    #[tokio::test]
    async fn login_user_keys_session_back_to_credential() {
        let (base_url, captured, server) = start_mock_server(vec![(
            200,
            r#"{"redirectURI":"https://app.snaptrade.com/connect/abc","sessionId":"sess-1"}"#
                .to_string(),
        )])
        .await;

        let client = SnapTradeClient::new(&base_url, test_credentials());
        let session = client
            .login_user("u1", "s1", "http://localhost:9001/")
            .await
            .expect("login");

        assert_eq!(session.redirect_uri, "https://app.snaptrade.com/connect/abc");
        assert_eq!(session.session_id.as_deref(), Some("sess-1"));
        assert_eq!(session.user_id, "u1");
        assert_eq!(session.user_secret, "s1");

        let requests = captured.lock().await.clone();
        assert!(requests[0].target.contains("userId=u1"));
        assert!(requests[0].target.contains("userSecret=s1"));
        assert!(requests[0].body.contains("redirectURI"));

        server.abort();
    }

    #[tokio::test]
    async fn api_error_detail_is_surfaced_with_status() {
        let (base_url, _captured, server) = start_mock_server(vec![(
            401,
            r#"{"detail":"Invalid signature","code":1076}"#.to_string(),
        )])
        .await;

        let client = SnapTradeClient::new(&base_url, test_credentials());
        let err = client.register_user("u1").await.expect_err("should fail");
        match err {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 401);
                assert!(message.contains("1076"));
                assert!(message.contains("Invalid signature"));
            }
            other => panic!("expected API error, got {:?}", other),
        }

        server.abort();
    }

    #[tokio::test]
    async fn list_accounts_parses_account_array() {
        let (base_url, _captured, server) = start_mock_server(vec![(
            200,
            r#"[
                {"id":"a1","status":"open","balance":{"total":{"amount":100.5,"currency":"USD"}}},
                {"id":"a2","status":"closed"}
            ]"#
            .to_string(),
        )])
        .await;

        let client = SnapTradeClient::new(&base_url, test_credentials());
        let accounts = client.list_accounts("u1", "s1").await.expect("accounts");
        assert_eq!(accounts.len(), 2);
        assert!(accounts[0].is_active());
        assert!(!accounts[1].is_active());

        server.abort();
    }

    #[tokio::test]
    async fn account_link_flow_registers_then_opens_portal() {
        let (base_url, _captured, server) = start_mock_server(vec![
            (
                200,
                r#"{"userId":"u1","userSecret":"issued-secret"}"#.to_string(),
            ),
            (
                200,
                r#"{"redirectURI":"https://app.snaptrade.com/connect/xyz"}"#.to_string(),
            ),
        ])
        .await;

        let client = SnapTradeClient::new(&base_url, test_credentials());
        let linked = crate::flow::AccountLink::register(&client, "u1")
            .await
            .expect("register step");
        assert_eq!(linked.credential().user_secret, "issued-secret");

        let session = linked
            .open_portal(&client, "http://localhost:9001/")
            .await
            .expect("portal step");
        assert_eq!(session.redirect_uri, "https://app.snaptrade.com/connect/xyz");
        assert_eq!(session.user_id, "u1");

        server.abort();
    }

    #[tokio::test]
    async fn transport_failure_is_http_error() {
        // Bind then drop so the port refuses connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let client = SnapTradeClient::new(&format!("http://{}", addr), test_credentials());
        let err = client.register_user("u1").await.expect_err("should fail");
        assert!(matches!(err, GatewayError::Http(_)));
    }
}
