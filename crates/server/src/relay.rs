//! The request relay: validate → dispatch → translate.
//!
//! [`Relay::handle`] never fails; every error is folded into a
//! [`RelayResult`] with a non-2xx status.

use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use genrelay_core::config::Config;
use genrelay_core::error::RelayError;
use genrelay_core::types::gemini::GeminiResponse;
use genrelay_provider::{GenerateTransport, UpstreamRequest, UpstreamResponse, common};
use genrelay_translator::{GenerateRequest, Target};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Terminal status/headers/body triple handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResult {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl RelayResult {
    pub fn json(status_code: u16, body: String) -> Self {
        Self::with_content_type(status_code, JSON_CONTENT_TYPE, body)
    }

    pub fn text(status_code: u16, body: String) -> Self {
        Self::with_content_type(status_code, TEXT_CONTENT_TYPE, body)
    }

    fn with_content_type(status_code: u16, content_type: &str, body: String) -> Self {
        Self {
            status_code,
            headers: BTreeMap::from([("content-type".to_string(), content_type.to_string())]),
            body,
        }
    }

    pub fn from_error(err: &RelayError) -> Self {
        let status = err.status_code().as_u16();
        if err.is_json() {
            Self::json(status, err.body())
        } else {
            Self::text(status, err.body())
        }
    }

    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

impl IntoResponse for RelayResult {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                header::HeaderName::try_from(name.as_str()),
                header::HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "Dropping invalid response header"),
            }
        }
        response
    }
}

pub struct Relay {
    api_key: Option<SecretString>,
    script_model: String,
    image_model: String,
    transport: Arc<dyn GenerateTransport>,
}

impl Relay {
    pub fn new(config: &Config, transport: Arc<dyn GenerateTransport>) -> Self {
        Self {
            api_key: config.api_key.clone(),
            script_model: config.script_model.clone(),
            image_model: config.image_model.clone(),
            transport,
        }
    }

    pub fn model_for(&self, target: Target) -> &str {
        match target {
            Target::Script => &self.script_model,
            Target::Image => &self.image_model,
        }
    }

    pub async fn handle(&self, method: &Method, body: &[u8]) -> RelayResult {
        match self.try_handle(method, body).await {
            Ok(result) => result,
            Err(err) => {
                let result = RelayResult::from_error(&err);
                match &err {
                    RelayError::MethodNotAllowed
                    | RelayError::InvalidTarget(_)
                    | RelayError::InvalidRequest(_) => {
                        tracing::info!(status = result.status_code, error = ?err, "Request rejected");
                    }
                    RelayError::ContentProhibited => {
                        tracing::warn!(status = result.status_code, "Image generation refused");
                    }
                    _ => {
                        tracing::error!(status = result.status_code, error = %err, "Relay failed");
                    }
                }
                result
            }
        }
    }

    async fn try_handle(&self, method: &Method, body: &[u8]) -> Result<RelayResult, RelayError> {
        if *method != Method::POST {
            return Err(RelayError::MethodNotAllowed);
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| RelayError::MalformedRequestBody(e.to_string()))?;

        let Some(api_key) = self.api_key.as_ref() else {
            tracing::error!("API key is missing from configuration");
            return Err(RelayError::MissingCredential);
        };

        let request = GenerateRequest::from_value(value)?;
        let outbound = request.build_payload()?;
        let model = self.model_for(outbound.target).to_string();

        tracing::info!(
            target_kind = %outbound.target,
            model = %model,
            transport = self.transport.identifier(),
            "Dispatching generation request"
        );

        let response = self
            .transport
            .generate(
                api_key,
                UpstreamRequest {
                    model,
                    payload: outbound.body.into(),
                },
            )
            .await?;

        translate_response(&request, response)
    }
}

/// Map an upstream answer onto the caller-facing result.
pub fn translate_response(
    request: &GenerateRequest,
    response: UpstreamResponse,
) -> Result<RelayResult, RelayError> {
    if !response.is_success() {
        return Err(common::upstream_error(&response));
    }

    let decoded: GeminiResponse = serde_json::from_slice(&response.body)?;
    if decoded.error.is_some() {
        return Err(common::upstream_error(&response));
    }

    match request {
        GenerateRequest::Script(_) => {
            let text = decoded.first_text().ok_or_else(|| {
                RelayError::Internal(format!(
                    "upstream returned no script text ({})",
                    decoded.refusal_reason().unwrap_or("no candidates")
                ))
            })?;
            Ok(RelayResult::json(200, text.to_string()))
        }
        GenerateRequest::Image(_) => match decoded.first_inline_data() {
            Some(image) => Ok(RelayResult::json(
                200,
                json!({ "imageUrl": format!("data:image/png;base64,{}", image.data) }).to_string(),
            )),
            None => {
                tracing::warn!(
                    reason = decoded.refusal_reason().unwrap_or("unknown"),
                    "No image data in upstream response"
                );
                Err(RelayError::ContentProhibited)
            }
        },
        GenerateRequest::Raw { .. } => Ok(RelayResult::json(
            200,
            String::from_utf8_lossy(&response.body).into_owned(),
        )),
    }
}
