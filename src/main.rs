mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod library;
mod params;
mod query;
mod ui;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::api::types::Genre;

#[derive(Parser, Debug)]
#[command(name = "sg9s")]
#[command(about = "A terminal UI for SpecGen story libraries, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/sg9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// SpecGen API base URL (overrides config)
  #[arg(short, long)]
  api_url: Option<String>,

  /// Restrict the library to one genre (sci-fi, fantasy, horror)
  #[arg(short, long)]
  genre: Option<String>,
}

/// Log to a file under the data dir; the TUI owns the terminal.
fn init_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join("sg9s");
  std::fs::create_dir_all(&dir)?;

  let appender = tracing_appender::rolling::never(dir, "sg9s.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_env("SG9S_LOG").unwrap_or_else(|_| EnvFilter::new("sg9s=info")),
    )
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _log_guard = init_tracing()?;

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Command-line overrides
  if let Some(url) = args.api_url {
    config.api.url = url;
  }
  if let Some(genre) = args.genre {
    config.library.genre =
      Some(Genre::parse(&genre).ok_or_else(|| eyre!("Unknown genre: {}", genre))?);
  }

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
