//! Response handling shared by the token exchange and the Graph client.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::ApiError;

/// Longest slice of an error body that goes into the error log.
const ERROR_BODY_LOG_LIMIT: usize = 300;

/// Pass the response through when the status is exactly 200.
///
/// Any other status drains the body into the log and fails with
/// [`ApiError::Provider`]. Only the start of the body is logged at error level.
pub async fn expect_ok(response: Response, operation: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    // Log error details for debugging (doesn't expose to user)
    let error_body = response.text().await.unwrap_or_default();
    error!(
        "{} failed: HTTP {} - {}",
        operation,
        status,
        truncate_body(&error_body, ERROR_BODY_LOG_LIMIT)
    );
    debug!("{} full error body: {}", operation, error_body);
    Err(ApiError::Provider { status })
}

/// Read the whole body and decode it as JSON.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

fn truncate_body(body: &str, limit: usize) -> String {
    let count = body.chars().count();
    if count <= limit {
        return body.to_string();
    }
    let head: String = body.chars().take(limit).collect();
    format!("{}... ({} chars)", head, count)
}
