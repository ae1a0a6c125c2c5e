/// Lumen - playback session host for the desktop
use anyhow::Context;
use clap::{Parser, Subcommand};
use lumen_cli::{config::CliConfig, inspect::inspect, run_session};
use lumen_core::payload;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lumen")]
#[command(about = "Lumen playback session host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted session for a playlist on the simulated engine
    Play {
        /// Playlist file (JSON array of media items)
        playlist: PathBuf,
        /// Configuration file path
        #[arg(short, long, env = "LUMEN_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Show how each playlist item would be played
    Inspect {
        /// Playlist file (JSON array of media items)
        playlist: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumen=info,lumen_cli=info,lumen_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { playlist, config } => {
            play(&playlist, config.as_deref())?;
        }
        Commands::Inspect { playlist } => {
            inspect_playlist(&playlist)?;
        }
    }

    Ok(())
}

fn read_playlist(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read playlist {}", path.display()))
}

fn play(playlist: &Path, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = CliConfig::load(config_path)?;
    let payload = read_playlist(playlist)?;

    tracing::info!("Starting session for {}", playlist.display());
    tracing::info!("Lifecycle: {:?}", config.playback.lifecycle);

    let report = run_session(&payload, &config)?;

    println!("Engines created: {}", report.engines_created);
    println!("Surface updates: {}", report.updates.len());
    if let Some(position) = report.handed_over {
        println!(
            "Handed over at window {} / {} ms",
            position.window_index, position.position_ms
        );
    }
    for message in report.errors_shown() {
        println!("Error shown: {}", message);
    }

    Ok(())
}

fn inspect_playlist(playlist: &Path) -> anyhow::Result<()> {
    let payload = read_playlist(playlist)?;
    let items = payload::decode_items(Some(&payload))
        .with_context(|| format!("Invalid playlist {}", playlist.display()))?;

    for row in inspect(&items) {
        println!("{}", row);
    }

    Ok(())
}
