use axum::http::StatusCode;
use serde_json::json;

/// Unified error type for all relay operations.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("API key is not configured on the server.")]
    MissingCredential,

    #[error("Invalid API target specified.")]
    InvalidTarget(Option<String>),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    MalformedRequestBody(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The image model answered without image data.
    #[error("PROHIBITED_CONTENT")]
    ContentProhibited,

    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Internal(String),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidTarget(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            // Upstream client and server errors are forwarded as-is; anything
            // else (e.g. an error envelope inside a 200) becomes a 500.
            Self::Upstream { status, .. } if *status >= 400 => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the response body for this error.
    ///
    /// Method and target rejections answer in plain text; everything else is
    /// a JSON object with a single `error` field.
    pub fn body(&self) -> String {
        match self {
            Self::MethodNotAllowed | Self::InvalidTarget(_) => self.to_string(),
            _ => json!({ "error": self.to_string() }).to_string(),
        }
    }

    pub fn is_json(&self) -> bool {
        !matches!(self, Self::MethodNotAllowed | Self::InvalidTarget(_))
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(format!("request timed out: {e}"))
        } else if e.is_connect() {
            Self::Network(format!("connection failed: {e}"))
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {e}"))
    }
}
