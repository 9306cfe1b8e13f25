use anyhow::{Context, Result};
use audiorecorder::{
    create_router, AppState, AudioRecorder, Config, MediaRecorderRecorder, Microphone, Output,
    ServiceAudioRecorder, SimulatedMediaRecorder,
};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "audiorecorder")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Record audio answers into a cache directory", long_about = None)]
struct Cli {
    /// Config file (extension optional)
    #[arg(short, long, global = true, default_value = "config/audiorecorder")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP control API
    Serve,

    /// Record once and print the finished session
    Record {
        /// Output kind (defaults to the configured one)
        #[arg(short, long, value_enum)]
        output: Option<Output>,

        /// Seconds to record before stopping
        #[arg(short, long, default_value = "5")]
        seconds: u64,

        /// Session ID (generated if not provided)
        #[arg(long)]
        session_id: Option<String>,
    },
}

fn build_recorder(cfg: &Config) -> Result<ServiceAudioRecorder> {
    let cache_dir = cfg.recorder.cache_dir()?;
    info!("Recording to cache dir: {}", cache_dir.display());

    let microphone = Microphone::new();
    let recorder = MediaRecorderRecorder::new(cache_dir, move || {
        SimulatedMediaRecorder::new(microphone.clone())
    });

    Ok(ServiceAudioRecorder::new(
        Box::new(recorder),
        cfg.recorder.intervals(),
    ))
}

async fn serve(cfg: Config) -> Result<()> {
    let recorder: Arc<dyn AudioRecorder> = Arc::new(build_recorder(&cfg)?);
    let app = create_router(AppState::new(recorder, cfg.recorder.default_output));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("{} listening on http://{}", cfg.service.name, addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}

async fn record(
    cfg: Config,
    output: Option<Output>,
    seconds: u64,
    session_id: Option<String>,
) -> Result<()> {
    let recorder = build_recorder(&cfg)?;
    let output = output.unwrap_or(cfg.recorder.default_output);
    let session_id = session_id.unwrap_or_else(|| format!("recording-{}", uuid::Uuid::new_v4()));

    if !recorder.start(session_id, output).await? {
        anyhow::bail!("Another recording is already in progress");
    }

    if let Some(failure) = recorder
        .current_session()
        .borrow()
        .as_ref()
        .and_then(|s| s.failed_to_start.clone())
    {
        anyhow::bail!("Recording did not start: {}", failure);
    }

    info!("Recording for {} seconds, press Ctrl+C to stop early", seconds);

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
        _ = tokio::signal::ctrl_c() => warn!("Interrupted, stopping early"),
    }

    let session = recorder
        .stop()
        .await?
        .context("No session after stopping")?;

    println!("{}", serde_json::to_string_pretty(&session)?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the finished session for `record`
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Loaded config: {}", cfg.service.name);

    match cli.command {
        Commands::Serve => serve(cfg).await,
        Commands::Record {
            output,
            seconds,
            session_id,
        } => record(cfg, output, seconds, session_id).await,
    }
}
