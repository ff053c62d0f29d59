mod app;
mod cli;

use clap::Parser;
use cli::Cli;
use genrelay_core::config::Config;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logging settings live in the config file, so it is read before init
    let file_config = Config::load(&cli.config)?;
    let _guard =
        genrelay_core::lifecycle::logging::init_logging(&cli.log_level, file_config.as_ref());

    let config = file_config.unwrap_or_else(|| {
        tracing::warn!("Config file '{}' not found, using defaults", cli.config);
        Config::default()
    });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let application = app::Application::build(&cli, config)?;
        application.serve().await
    })
}
