//! Health endpoint.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

pub const SERVICE_NAME: &str = "SnapTrade Proxy Server";

/// Documented public endpoints, reported in the health payload.
const ENDPOINTS: [&str; 4] = [
    "POST /api/snaptrade/register",
    "POST /api/snaptrade/login",
    "POST /api/snaptrade/accounts",
    "GET /health",
];

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now().to_rfc3339(),
        service: SERVICE_NAME,
        endpoints: ENDPOINTS.to_vec(),
    })
}
