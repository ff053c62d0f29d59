use crate::{GenerateTransport, UpstreamRequest, UpstreamResponse, common};
use async_trait::async_trait;
use genrelay_core::config::Config;
use genrelay_core::error::RelayError;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

/// reqwest-backed client for the Generative Language API.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        Ok(Self {
            client: genrelay_core::proxy::build_http_client(config)?,
            base_url: config.base_url.clone(),
        })
    }

    /// `{base}/v1beta/models/{model}:generateContent?key=...`
    ///
    /// The returned URL carries the credential and must never be logged.
    pub fn generate_url(&self, model: &str, api_key: &SecretString) -> Result<Url, RelayError> {
        let endpoint = format!("{}/v1beta/models/{model}:generateContent", self.base_url);
        Url::parse_with_params(&endpoint, &[("key", api_key.expose_secret().as_str())])
            .map_err(|e| RelayError::Internal(format!("invalid upstream endpoint: {e}")))
    }
}

#[async_trait]
impl GenerateTransport for GeminiClient {
    fn identifier(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        api_key: &SecretString,
        request: UpstreamRequest,
    ) -> Result<UpstreamResponse, RelayError> {
        let url = self.generate_url(&request.model, api_key)?;

        tracing::debug!(
            model = %request.model,
            payload_bytes = request.payload.len(),
            "Sending generateContent request"
        );

        let resp = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(request.payload)
            .send()
            .await
            .map_err(|e| RelayError::from(e.without_url()))?;

        common::read_response(resp).await
    }
}
