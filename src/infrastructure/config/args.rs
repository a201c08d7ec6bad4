use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "infinigallery",
    version,
    about = "Infinite-scroll image gallery engine with a headless driver",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Listing API access key.
    #[arg(long, env = "UNSPLASH_ACCESS_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Listing endpoint URL.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Ordering criterion for the listing.
    #[arg(long)]
    pub order_by: Option<String>,

    /// Upper bound on page numbers.
    #[arg(long)]
    pub total_pages: Option<u32>,

    /// Image cache budget in bytes.
    #[arg(long, value_name = "BYTES")]
    pub cache_capacity: Option<usize>,

    /// Stop after scrolling past this many items.
    #[arg(long, default_value_t = 60)]
    pub max_items: usize,
}
