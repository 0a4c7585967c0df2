//! lawful-ai-rs: legal-advice chat server.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lawful_ai::config::Config;
use lawful_ai::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(name = "lawful-ai-rs", about = "Legal-advice chat server with spoken replies")]
struct Args {
    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,

    /// Do not play synthesized replies on this machine
    #[arg(long)]
    no_playback: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise keep hyper/reqwest internals quiet
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug,hyper=info,reqwest=info")
        } else {
            EnvFilter::new("info,hyper=warn,reqwest=warn")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("lawful-ai-rs starting");

    let mut config = Config::load(args.config.as_deref());
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_playback {
        config.playback.enabled = false;
    }
    info!(
        "Model: {} (timeout {}s), audio: {}, playback: {}",
        config.completion.model,
        config.completion.timeout_secs,
        config.tts.audio_path.display(),
        config.playback.enabled,
    );

    let state = AppState::from_config(&config)?;
    server::run(&config, state).await?;

    Ok(())
}
