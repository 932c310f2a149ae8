use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dash_bridge::{
    config::Config,
    extractor::YtDlpExtractor,
    models::{PlaybackMode, ResolvedPlayback},
    resolver::{
        PlaybackResolver, StaticAddonDirectory,
        intent::{LoggingIntentLauncher, LoggingNotifier},
        video_id_from_url,
    },
};

#[derive(Parser)]
#[command(name = "dash-bridge")]
#[command(about = "Resolve a playable stream for a remote video identifier")]
#[command(long_about = None)]
struct Cli {
    /// Video identifier, or a recognized watch/plugin URL to extract it from
    video: String,

    /// Playback mode override (app-intent, youtube-plugin, tubed-plugin, extract)
    #[arg(short, long)]
    mode: Option<PlaybackMode>,

    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Staging directory override for the synthesized manifest
    #[arg(short, long, value_name = "DIR")]
    staging_dir: Option<std::path::PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("dash_bridge={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(staging_dir) = cli.staging_dir {
        config.staging.dir = staging_dir;
    }

    let video_id = match video_id_from_url(&cli.video) {
        Some(id) => id,
        None => cli.video.clone(),
    };

    let extractor = Arc::new(YtDlpExtractor::from_config(&config.extractor));
    let resolver = PlaybackResolver::new(
        config,
        extractor,
        Arc::new(StaticAddonDirectory::default()),
        Arc::new(LoggingIntentLauncher),
        Arc::new(LoggingNotifier),
    );

    let outcome = match cli.mode {
        Some(mode) => resolver.resolve_with_mode(&video_id, mode).await?,
        None => resolver.resolve(&video_id).await?,
    };

    match outcome {
        ResolvedPlayback::Launched => {
            info!("external application launched for video {}", video_id);
        }
        ResolvedPlayback::Item(item) => {
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
    }

    Ok(())
}
