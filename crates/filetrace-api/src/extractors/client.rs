//! Client metadata extractor for unauthenticated endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use filetrace_service::context::ClientMeta;

use crate::state::AppState;

/// Extracted source address and user agent, for audit attribution of
/// public token-based access.
#[derive(Debug, Clone)]
pub struct ClientInfo(pub ClientMeta);

/// First address in `X-Forwarded-For`, or `"unknown"` when absent.
pub(crate) fn source_address(parts: &Parts) -> String {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// The `User-Agent` header, when present and valid UTF-8.
pub(crate) fn user_agent(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo(ClientMeta {
            source_address: source_address(parts),
            user_agent: user_agent(parts),
        }))
    }
}
