//! songgame-server - playlist party game service
//!
//! Serves the shared game over HTTP: playlist uploads, players, scoring,
//! game flow, and an SSE stream so every viewer stays in sync.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use songgame_common::config::{ConfigOverrides, GameConfig, PlaybackMode};
use songgame_common::events::EventBus;
use songgame_common::playback::{NoopLauncher, TrackLauncher};
use songgame_common::GameHost;
use songgame_server::launcher::SystemLauncher;
use songgame_server::{build_router, AppState};
use tracing::info;

/// Command-line arguments (highest configuration priority)
#[derive(Debug, Parser)]
#[command(name = "songgame-server", version, about = "Playlist party game server")]
struct Args {
    /// TOML config file (default: <config dir>/songgame/config.toml)
    #[arg(long, env = "SONGGAME_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8501
    #[arg(long)]
    bind: Option<String>,

    /// Default number of songs drawn per uploader
    #[arg(long)]
    songs_per_player: Option<usize>,

    /// Bundled dataset used when nothing was uploaded
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Playback mode: "link" or "auto_open"
    #[arg(long)]
    playback: Option<String>,

    /// Disable the "previous song was released in" hint
    #[arg(long)]
    no_year_guessing: bool,
}

impl Args {
    fn overrides(&self) -> Result<ConfigOverrides> {
        let playback = self
            .playback
            .as_deref()
            .map(str::parse::<PlaybackMode>)
            .transpose()?;
        Ok(ConfigOverrides {
            config_file: self.config.clone(),
            bind_address: self.bind.clone(),
            songs_per_player: self.songs_per_player,
            default_dataset: self.dataset.clone(),
            playback,
            year_guessing: self.no_year_guessing.then_some(false),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting songgame-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config = GameConfig::load(&args.overrides()?).context("Failed to load configuration")?;
    info!(
        bind = %config.bind_address,
        playback = ?config.playback,
        year_guessing = config.year_guessing,
        dataset = %config.default_dataset.display(),
        "Configuration loaded"
    );

    let launcher: Box<dyn TrackLauncher> = match config.playback {
        PlaybackMode::AutoOpen => Box::new(SystemLauncher::new()),
        PlaybackMode::Link => Box::new(NoopLauncher),
    };
    let event_bus = EventBus::new(config.event_capacity);
    let bind_address = config.bind_address.clone();

    let host = GameHost::new(config, event_bus, launcher);
    let state = AppState::new(host);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("songgame-server listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
