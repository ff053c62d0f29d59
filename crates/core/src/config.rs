use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Environment variable holding the upstream API credential.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_SCRIPT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

// ─── Config ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Upstream credential. Never written back out.
    #[serde(skip_serializing)]
    pub api_key: Option<SecretString>,

    // Upstream endpoint and models
    pub base_url: String,
    pub script_model: String,
    pub image_model: String,

    // Outbound proxy
    pub proxy_url: Option<String>,

    // Timeouts (seconds)
    pub connect_timeout: u64,
    pub request_timeout: u64,

    // Request body size limit (MB)
    pub body_limit_mb: usize,

    // Logging
    pub logging_to_file: bool,
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            script_model: DEFAULT_SCRIPT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            proxy_url: None,
            connect_timeout: 30,
            request_timeout: 300,
            body_limit_mb: 20,
            logging_to_file: false,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load config from a YAML file, sanitize, and validate.
    ///
    /// A missing file yields `Ok(None)`; a file that exists but fails to
    /// parse or validate is an error.
    pub fn load(path: &str) -> Result<Option<Self>, anyhow::Error> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_yaml(&contents)
                .map(Some)
                .map_err(|e| e.context(format!("invalid config file '{path}'"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context(format!("failed to read '{path}'"))),
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
        let mut config: Config = serde_yaml_ng::from_str(contents)?;
        config.sanitize();
        config.validate()?;
        Ok(config)
    }

    /// Apply the credential from the environment, if set. The environment
    /// always wins over the file.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            self.set_api_key(key);
        }
    }

    pub fn set_api_key(&mut self, key: String) {
        let key = key.trim().to_string();
        self.api_key = if key.is_empty() {
            None
        } else {
            Some(SecretString::new(key))
        };
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        anyhow::ensure!(!self.base_url.is_empty(), "base-url must not be empty");
        url::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("invalid base-url '{}': {e}", self.base_url))?;
        anyhow::ensure!(
            !self.script_model.is_empty(),
            "script-model must not be empty"
        );
        anyhow::ensure!(!self.image_model.is_empty(), "image-model must not be empty");
        if let Some(ref proxy) = self.proxy_url {
            crate::proxy::validate_proxy_url(proxy)?;
        }
        Ok(())
    }

    /// Sanitize and normalize configuration.
    fn sanitize(&mut self) {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self.script_model = self.script_model.trim().to_string();
        self.image_model = self.image_model.trim().to_string();
        if self.proxy_url.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.proxy_url = None;
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8888);
        assert!(!cfg.has_api_key());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.script_model, DEFAULT_SCRIPT_MODEL);
        assert_eq!(cfg.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(cfg.connect_timeout, 30);
        assert_eq!(cfg.request_timeout, 300);
        assert_eq!(cfg.body_limit_mb, 20);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_yaml_deserialization() {
        let yaml = r#"
host: "127.0.0.1"
port: 9000
api-key: "file-key"
base-url: "https://example.test/"
image-model: " gemini-custom-image "
proxy-url: "socks5://127.0.0.1:1080"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.image_model, "gemini-custom-image");
        assert_eq!(config.script_model, DEFAULT_SCRIPT_MODEL);
        assert_eq!(
            config.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("file-key")
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(Config::from_yaml("proxy-url: \"ftp://proxy:21\"").is_err());
        assert!(Config::from_yaml("script-model: \"  \"").is_err());
        assert!(Config::from_yaml("base-url: \"not a url\"").is_err());
    }

    #[test]
    fn test_empty_proxy_url_is_direct() {
        let config = Config::from_yaml("proxy-url: \"\"").unwrap();
        assert!(config.proxy_url.is_none());
    }

    #[test]
    fn test_set_api_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("  abc  ".into());
        assert_eq!(
            cfg.api_key.as_ref().map(|k| k.expose_secret().as_str()),
            Some("abc")
        );

        cfg.set_api_key("   ".into());
        assert!(!cfg.has_api_key());
    }

    #[test]
    fn test_api_key_is_redacted() {
        let mut cfg = Config::default();
        cfg.set_api_key("super-secret".into());
        assert!(!format!("{cfg:?}").contains("super-secret"));
        assert!(!serde_yaml_ng::to_string(&cfg).unwrap().contains("super-secret"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.yaml");
        assert!(Config::load(missing.to_str().unwrap()).unwrap().is_none());

        let valid = dir.path().join("valid.yaml");
        std::fs::write(&valid, "port: 7001\n").unwrap();
        let config = Config::load(valid.to_str().unwrap()).unwrap().unwrap();
        assert_eq!(config.port, 7001);

        // Present but invalid must not silently fall back to defaults
        let invalid = dir.path().join("invalid.yaml");
        std::fs::write(&invalid, "proxy-url: \"ftp://proxy:21\"\n").unwrap();
        let err = Config::load(invalid.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config file"));
    }
}
