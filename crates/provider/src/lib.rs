pub mod common;
pub mod gemini;

use async_trait::async_trait;
use bytes::Bytes;
use genrelay_core::error::RelayError;
use secrecy::SecretString;

/// One outbound `generateContent` call.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub model: String,
    pub payload: Bytes,
}

/// Raw upstream answer. Status interpretation is left to the caller.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Seam between the relay and the network.
#[async_trait]
pub trait GenerateTransport: Send + Sync {
    fn identifier(&self) -> &str;

    /// Send a single request. No retries; transport failures are returned
    /// as [`RelayError::Network`].
    async fn generate(
        &self,
        api_key: &SecretString,
        request: UpstreamRequest,
    ) -> Result<UpstreamResponse, RelayError>;
}
