use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use infinigallery::infrastructure::{
    AppConfig, CliArgs, ConfigStore, ImageRsDecoder, ReqwestHttpClient,
};
use infinigallery::presentation::{App, DriverOptions, LogViewNotifier};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn create_app() -> Result<App> {
    let args = CliArgs::parse();
    let options = DriverOptions {
        max_items: args.max_items,
        ..DriverOptions::default()
    };

    let store = ConfigStore::locate(args.config.as_deref())?;
    let mut config = store
        .load_or_init()
        .wrap_err_with(|| format!("failed to load {}", store.path().display()))?;
    config.merge_with_args(args);

    init_logging(&config)?;

    info!(version = infinigallery::VERSION, "Starting Infinigallery");

    let settings = config
        .gallery_settings()
        .wrap_err("invalid gallery configuration")?;
    let http = Arc::new(ReqwestHttpClient::with_options(
        settings.timeout,
        &settings.user_agent,
    )
    .wrap_err("failed to build HTTP client")?);
    let decoder = Arc::new(ImageRsDecoder::new());
    let notifier = Arc::new(LogViewNotifier::new());

    Ok(App::new(&settings, http, decoder, notifier, options))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    color_eyre::install()?;

    let app = create_app()?;
    let summary = app.run().await;

    println!("{summary}");
    Ok(())
}
