//! Inbound request parsing and outbound `generateContent` payload construction.
//!
//! A browser body is validated into a closed [`GenerateRequest`] before any
//! payload is built; each variant owns its own construction rule.

pub mod image;
pub mod script;

use genrelay_core::error::RelayError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use image::ImageRequest;
pub use script::ScriptRequest;

/// Generation mode selected by the `target` (or `type`) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Script,
    Image,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "script" => Ok(Self::Script),
            "image" => Ok(Self::Image),
            other => Err(RelayError::InvalidTarget(Some(other.to_string()))),
        }
    }
}

/// A validated inbound request.
#[derive(Debug, Clone)]
pub enum GenerateRequest {
    Script(ScriptRequest),
    Image(ImageRequest),
    /// Pre-built payload forwarded verbatim to the target's endpoint.
    Raw { target: Target, payload: Value },
}

/// Serialized outbound body, ready for the transport.
#[derive(Debug, Clone)]
pub struct OutboundPayload {
    pub target: Target,
    pub body: Vec<u8>,
}

impl GenerateRequest {
    /// Validate a decoded JSON body.
    ///
    /// The discriminator is read from `target`, falling back to `type`. A
    /// `payload` object switches to raw passthrough.
    pub fn from_value(body: Value) -> Result<Self, RelayError> {
        let target = discriminator(&body)?;

        if let Some(payload) = body.get("payload").filter(|v| !v.is_null()) {
            if !payload.is_object() {
                return Err(RelayError::InvalidRequest(
                    "payload must be a JSON object".into(),
                ));
            }
            return Ok(Self::Raw {
                target,
                payload: payload.clone(),
            });
        }

        match target {
            Target::Script => {
                let req: ScriptRequest = decode(body)?;
                req.validate()?;
                Ok(Self::Script(req))
            }
            Target::Image => Ok(Self::Image(decode(body)?)),
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Self::Script(_) => Target::Script,
            Self::Image(_) => Target::Image,
            Self::Raw { target, .. } => *target,
        }
    }

    pub fn build_payload(&self) -> Result<OutboundPayload, RelayError> {
        let body = match self {
            Self::Script(req) => serde_json::to_vec(&script::build_payload(req))?,
            Self::Image(req) => serde_json::to_vec(&image::build_payload(req))?,
            Self::Raw { payload, .. } => serde_json::to_vec(payload)?,
        };
        Ok(OutboundPayload {
            target: self.target(),
            body,
        })
    }
}

fn discriminator(body: &Value) -> Result<Target, RelayError> {
    let value = body
        .get("target")
        .filter(|v| !v.is_null())
        .or_else(|| body.get("type"))
        .ok_or(RelayError::InvalidTarget(None))?;

    match value.as_str() {
        Some(s) => s.parse(),
        None => Err(RelayError::InvalidTarget(Some(value.to_string()))),
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, RelayError> {
    serde_json::from_value(body).map_err(|e| RelayError::InvalidRequest(e.to_string()))
}

/// Treat blank strings like missing fields.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_from_either_field() {
        let req = GenerateRequest::from_value(json!({"target": "script", "prompt": "x"})).unwrap();
        assert_eq!(req.target(), Target::Script);

        let req = GenerateRequest::from_value(json!({"type": "image", "description": "x"})).unwrap();
        assert_eq!(req.target(), Target::Image);

        // `target` wins when both are present
        let req = GenerateRequest::from_value(json!({"target": "image", "type": "script"})).unwrap();
        assert_eq!(req.target(), Target::Image);
    }

    #[test]
    fn test_missing_or_unknown_target() {
        for body in [
            json!({"prompt": "x"}),
            json!({"target": "video"}),
            json!({"target": 7}),
            json!({"target": null}),
            json!([1, 2, 3]),
            json!("script"),
        ] {
            let err = GenerateRequest::from_value(body.clone()).unwrap_err();
            assert!(
                matches!(err, RelayError::InvalidTarget(_)),
                "expected InvalidTarget for {body}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_script_requires_prompt() {
        let err = GenerateRequest::from_value(json!({"target": "script"})).unwrap_err();
        assert!(matches!(err, RelayError::InvalidRequest(_)));

        let err = GenerateRequest::from_value(json!({"target": "script", "prompt": "  "})).unwrap_err();
        assert!(matches!(err, RelayError::InvalidRequest(_)));
    }

    #[test]
    fn test_wrong_field_types_rejected() {
        let err =
            GenerateRequest::from_value(json!({"target": "script", "prompt": 42})).unwrap_err();
        assert!(matches!(err, RelayError::InvalidRequest(_)));

        let err = GenerateRequest::from_value(json!({"target": "image", "useGuideImage": "yes"}))
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidRequest(_)));
    }

    #[test]
    fn test_raw_passthrough() {
        let payload = json!({"contents": [{"parts": [{"text": "hi"}]}]});
        let req = GenerateRequest::from_value(json!({"target": "script", "payload": payload.clone()}))
            .unwrap();
        assert!(matches!(req, GenerateRequest::Raw { target: Target::Script, .. }));

        let out = req.build_payload().unwrap();
        assert_eq!(out.target, Target::Script);
        let sent: Value = serde_json::from_slice(&out.body).unwrap();
        assert_eq!(sent, payload);

        let err = GenerateRequest::from_value(json!({"target": "image", "payload": "nope"}))
            .unwrap_err();
        assert!(matches!(err, RelayError::InvalidRequest(_)));
    }

    #[test]
    fn test_null_payload_is_absent() {
        let req = GenerateRequest::from_value(
            json!({"target": "script", "prompt": "a heist", "payload": null}),
        )
        .unwrap();
        assert!(matches!(req, GenerateRequest::Script(_)));

        let req = GenerateRequest::from_value(json!({"type": "image", "payload": null})).unwrap();
        assert!(matches!(req, GenerateRequest::Image(_)));
    }

    #[test]
    fn test_build_payload_serializes_typed_request() {
        let req = GenerateRequest::from_value(json!({"target": "image", "description": "a cat"}))
            .unwrap();
        let out = req.build_payload().unwrap();
        let sent: Value = serde_json::from_slice(&out.body).unwrap();
        assert!(sent["safetySettings"].is_array());
        assert_eq!(out.target, Target::Image);
    }
}
