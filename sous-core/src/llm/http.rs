//! Request plumbing shared by the HTTP-backed providers.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::LlmError;

/// `{"error": {"message": ...}}`, the envelope both Anthropic and OpenAI-style APIs use.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Send `request` and decode a successful JSON body as `T`.
///
/// 429 becomes `RateLimited` (with `retry-after` when the server sent one); any
/// other non-2xx status becomes `ApiError` carrying the API's own message.
pub(super) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, LlmError> {
    let response = request
        .send()
        .await
        .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        return Err(LlmError::RateLimited { retry_after_secs });
    }

    let body = response
        .text()
        .await
        .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

    if !status.is_success() {
        return Err(LlmError::ApiError {
            status: status.as_u16(),
            message: error_message(body),
        });
    }

    serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))
}

/// The API's error message if the body is an error envelope, else the body itself.
fn error_message(body: String) -> String {
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body,
    }
}
