use crate::config::Config;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// Build the outbound HTTP client from config.
///
/// A configured `proxy-url` routes all traffic through it; otherwise the
/// client connects directly and ignores system proxy env vars.
pub fn build_http_client(config: &Config) -> Result<Client, anyhow::Error> {
    let mut builder = Client::builder()
        .user_agent(concat!("genrelay/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(config.connect_timeout));

    // 0 disables the overall deadline
    if config.request_timeout > 0 {
        builder = builder.timeout(Duration::from_secs(config.request_timeout));
    }

    if let Some(url) = config.proxy_url.as_deref() {
        let proxy = Proxy::all(url)?; // reqwest auto-detects http/https/socks5
        builder = builder.proxy(proxy);
    } else {
        builder = builder.no_proxy();
    }

    Ok(builder.build()?)
}

/// Validate that a proxy URL is well-formed.
pub fn validate_proxy_url(url: &str) -> Result<(), anyhow::Error> {
    if url.is_empty() {
        return Ok(());
    }
    let parsed =
        url::Url::parse(url).map_err(|e| anyhow::anyhow!("invalid proxy URL '{url}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" | "socks5" => Ok(()),
        scheme => Err(anyhow::anyhow!(
            "unsupported proxy scheme '{scheme}' in URL '{url}', expected http/https/socks5"
        )),
    }
}
