use crate::UpstreamResponse;
use genrelay_core::error::RelayError;
use genrelay_core::types::gemini::GeminiErrorEnvelope;

/// Generic message used when the upstream error body carries none.
pub const GENERIC_UPSTREAM_ERROR: &str = "The generation service returned an error.";

/// Read status and body of a response without judging the status.
pub async fn read_response(resp: reqwest::Response) -> Result<UpstreamResponse, RelayError> {
    let status = resp.status().as_u16();
    let body = resp
        .bytes()
        .await
        .map_err(|e| RelayError::from(e.without_url()))?;
    Ok(UpstreamResponse { status, body })
}

/// Pull `error.message` out of an upstream error body.
pub fn upstream_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<GeminiErrorEnvelope>(body)
        .ok()?
        .error?
        .message
        .filter(|m| !m.trim().is_empty())
}

/// Build the error for a non-2xx upstream response.
pub fn upstream_error(resp: &UpstreamResponse) -> RelayError {
    RelayError::Upstream {
        status: resp.status,
        message: upstream_error_message(&resp.body)
            .unwrap_or_else(|| GENERIC_UPSTREAM_ERROR.to_string()),
    }
}
