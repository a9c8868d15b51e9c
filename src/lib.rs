pub mod audio;
pub mod commands;
pub mod console;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use audio::{PlaybackController, RodioOutput};
use engine::openai_tts::OpenAiSpeech;
use engine::{parse_speed, SynthesisClient, Voice};
use state::AppState;

pub use error::Error;

/// Read text aloud through the OpenAI speech API
#[derive(Parser, Debug)]
#[command(name = "read-aloud")]
#[command(version)]
pub struct Args {
    /// OpenAI API key (kept for this session only)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Voice for this session: alloy, echo, fable, onyx, nova or shimmer
    #[arg(long)]
    pub voice: Option<String>,

    /// Speaking speed for this session (0.25 - 4.0)
    #[arg(long)]
    pub speed: Option<String>,

    /// Speech model for this session
    #[arg(long)]
    pub model: Option<String>,

    /// Speech endpoint URL for this session
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial text to read
    #[arg(long)]
    pub text: Option<String>,

    /// More logging (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::info!("Starting Read Aloud v{}", env!("CARGO_PKG_VERSION"));

    let settings_path = match args.config.clone() {
        Some(path) => path,
        None => persistence::settings_path()?,
    };
    let stored = persistence::load_settings(&settings_path);
    tracing::info!("Settings loaded from {}", settings_path.display());

    let endpoint = args.endpoint.clone().unwrap_or_else(|| stored.tts.endpoint.clone());
    let backend = OpenAiSpeech::new(endpoint)
        .context("Failed to create HTTP client")?;
    tracing::info!("Using speech endpoint {}", backend.endpoint());

    let output = RodioOutput::new().context("Failed to open audio output")?;

    let mut state = AppState::new(
        stored,
        PlaybackController::new(Box::new(output)),
        SynthesisClient::new(Arc::new(backend)),
    )
    .with_settings_path(settings_path);

    // Command-line values only touch the session view; `persisted` is what
    // gets written back
    let session = &mut state.settings.tts;
    if let Some(voice) = &args.voice {
        session.voice = voice.parse::<Voice>().context("Invalid --voice")?;
    }
    if let Some(speed) = &args.speed {
        session.speed = parse_speed(speed).context("Invalid --speed")?;
    }
    if let Some(model) = &args.model {
        session.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        session.endpoint = endpoint.clone();
    }

    if let Some(key) = &args.api_key {
        commands::settings::set_credential(&mut state, key);
    }
    if let Some(text) = args.text {
        state.text = text;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(console::run_console(state))
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("read_aloud_lib={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
