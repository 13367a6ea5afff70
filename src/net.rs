//! Shared HTTP helpers for the provider API clients.

use crate::error::VoxError;

/// Maps a reqwest transport failure to a `Network` error with a message a
/// user can act on.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> VoxError {
    let message = if err.is_connect() {
        format!("failed to connect to the {provider} API server; check your internet connection")
    } else if err.is_timeout() {
        format!("request to {provider} timed out; the API server is not responding")
    } else {
        format!("{provider} request failed: {err}")
    };
    VoxError::Network(message)
}

/// Passes 2xx responses through; anything else becomes an `Api` error
/// carrying the provider's error body verbatim.
pub(crate) async fn error_for_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, VoxError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    tracing::error!("{provider} API error (status {status}): {body}");
    Err(VoxError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Joins a configured base URL with an endpoint path, tolerating trailing
/// slashes in user-entered URLs.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
