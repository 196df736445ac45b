//! Shared HTTP helpers for the platform services.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use tracing::warn;

use crate::error::LinkError;

/// Build request headers carrying the session token, when one is known.
///
/// A token that cannot be sent under `header_name` is left out and logged;
/// the request then goes out without a session.
pub fn session_headers(header_name: &str, token: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let Some(token) = token else {
        return headers;
    };
    let name = match HeaderName::from_bytes(header_name.as_bytes()) {
        Ok(name) => name,
        Err(e) => {
            warn!(header = header_name, error = %e, "Session token header name is invalid, sending request without token");
            return headers;
        }
    };
    match HeaderValue::from_str(token) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => {
            warn!(header = header_name, error = %e, "Session token is not a valid header value, sending request without token");
        }
    }
    headers
}

/// Check that `name` can be used as the session token header.
pub fn validate_header_name(name: &str) -> Result<(), LinkError> {
    HeaderName::from_bytes(name.as_bytes())
        .map(|_| ())
        .map_err(|e| LinkError::Configuration(format!("Invalid token header name {name:?}: {e}")))
}

/// Map a transport failure, reporting client timeouts as [`LinkError::Timeout`].
pub fn transport_error(err: reqwest::Error, timeout: Duration) -> LinkError {
    if err.is_timeout() {
        LinkError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
    } else {
        LinkError::Network(err)
    }
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> LinkError {
    let message = extract_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => LinkError::Authentication(message),
        _ => LinkError::api(status, message),
    }
}

/// Return the response untouched on success, or the mapped error.
pub async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, LinkError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(status_to_error(status.as_u16(), &body))
}

fn extract_message(body: &str) -> Option<String> {
    // The platform reports errors as {"message": "...", "type": "..."}
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
}
