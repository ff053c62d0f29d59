//! Application assembly and serving.

use crate::cli::Cli;
use genrelay_core::config::{API_KEY_ENV, Config};
use genrelay_core::lifecycle::signal::SignalHandler;
use genrelay_provider::gemini::GeminiClient;
use genrelay_server::relay::Relay;
use genrelay_server::{AppState, build_router};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

pub struct Application {
    addr: String,
    app_router: axum::Router,
    shutdown_timeout: u64,
}

impl Application {
    /// Apply CLI and environment overrides to the loaded config and wire the
    /// relay.
    pub fn build(cli: &Cli, mut config: Config) -> anyhow::Result<Self> {

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.port = port;
        }
        config.apply_env();
        config.validate()?;

        if !config.has_api_key() {
            tracing::warn!(
                "{API_KEY_ENV} is not set; generation requests will fail until it is configured"
            );
        }

        let transport = Arc::new(GeminiClient::new(&config)?);
        let relay = Arc::new(Relay::new(&config, transport));

        tracing::info!(
            script_model = %config.script_model,
            image_model = %config.image_model,
            proxy = config.proxy_url.is_some(),
            "Relay configured"
        );

        let addr = format!("{}:{}", config.host, config.port);
        let app_router = build_router(AppState {
            config: Arc::new(config),
            relay,
        });

        Ok(Self {
            addr,
            app_router,
            shutdown_timeout: cli.shutdown_timeout,
        })
    }

    /// Serve until SIGINT/SIGTERM, then drain in-flight requests.
    pub async fn serve(self) -> anyhow::Result<()> {
        let Self {
            addr,
            app_router,
            shutdown_timeout,
        } = self;

        let (signal_handler, mut shutdown_rx) = SignalHandler::new();
        tokio::spawn(signal_handler.run());

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Listening on {addr}");

        let mut drain_rx = shutdown_rx.clone();
        let server = axum::serve(listener, app_router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|v| *v).await;
                tracing::info!("Stopping listener, waiting for connections to drain...");
            })
            .into_future();

        tokio::select! {
            res = server => res?,
            _ = async {
                let _ = drain_rx.wait_for(|v| *v).await;
                tokio::time::sleep(Duration::from_secs(shutdown_timeout)).await;
            } => {
                tracing::warn!("Drain timeout of {shutdown_timeout}s exceeded, forcing exit");
            }
        }

        tracing::info!("Server stopped");
        Ok(())
    }
}
