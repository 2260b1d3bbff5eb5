//! # Image Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso della CLI.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Caricamento della configurazione (file JSON + override da CLI)
//! - Esecuzione della compressione su un thread bloccante, interrompibile con Ctrl-C
//! - Traduzione dell'esito in una notifica testuale o in un evento JSON
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-compressor photo.png photo.jpg 200 --step 5 --verbose
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use image_size_compressor::{
    config::CompressionConfig,
    error::CompressError,
    file_system::{FileSystem, LocalFileSystem},
    json_output::JsonMessage,
    progress::CompressionSpinner,
    shell::{self, CompressionJob},
    utils::format_size,
    CompressionResult, Notification, ShellInput,
};

#[derive(Parser)]
#[command(name = "image-compressor")]
#[command(about = "Compress an image until it fits under a target size")]
struct Args {
    /// Image to compress (JPEG, PNG, WebP, BMP or GIF)
    input: String,

    /// Where to write the result (.jpg/.jpeg or .png; no extension means .jpg)
    output: String,

    /// Target size in KB (1 KB = 1024 bytes)
    target_kb: String,

    /// Quality decrement per attempt [default: 10]
    #[arg(short, long)]
    step: Option<u8>,

    /// Initial quality (1-100) [default: 85]
    #[arg(short, long)]
    quality: Option<u8>,

    /// Config file (default: ~/.image-compressor/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save the effective step/quality to the config file
    #[arg(long)]
    save_config: bool,

    /// Fail when the target size cannot be reached
    #[arg(long)]
    strict: bool,

    /// Output progress and result as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let json = args.json;
    let strict = args.strict;
    let outcome = run(args).await;

    if json {
        match &outcome {
            Ok((result, original_size)) => JsonMessage::complete(result, *original_size).emit(),
            Err(e) => JsonMessage::error(e).emit(),
        }
    }

    let outcome = outcome.map(|(result, _)| result);
    let notification = Notification::from_outcome(&outcome, strict);
    if !json {
        match &notification {
            Notification::Success { message } => println!("{}", message),
            Notification::Failure { message } => eprintln!("{}: {}", notification.title(), message),
        }
    }

    if !notification.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

/// Validate input, load config and run the compression; returns the result and the input size
async fn run(args: Args) -> std::result::Result<(CompressionResult, u64), CompressError> {
    let job = ShellInput::new(args.input, args.output, args.target_kb).parse()?;
    let config = CompressionConfig::resolve(
        args.config.as_deref(),
        args.step,
        args.quality,
        args.save_config,
    )
    .await?;
    let original_size = LocalFileSystem.size_in_bytes(&job.input)?;

    if args.json {
        JsonMessage::start(job.input.clone(), job.output.clone(), job.target_size_kb, &config).emit();
    }

    let spinner = if args.json {
        CompressionSpinner::hidden()
    } else {
        CompressionSpinner::new(&format!(
            "Compressing {} to {} KB",
            job.input.display(),
            job.target_size_kb
        ))
    };

    match compress_interruptible(job, config).await {
        Ok(result) => {
            spinner.finish(&format!(
                "{} -> {} after {} attempt(s)",
                format_size(original_size),
                format_size(result.achieved_bytes),
                result.attempts.len()
            ));
            Ok((result, original_size))
        }
        Err(e) => {
            spinner.abandon("Failed");
            Err(e)
        }
    }
}

/// Run the blocking compression off the runtime, stopping the wait on Ctrl-C
async fn compress_interruptible(
    job: CompressionJob,
    config: CompressionConfig,
) -> std::result::Result<CompressionResult, CompressError> {
    let output = job.output.clone();
    let handle = tokio::task::spawn_blocking(move || shell::run_job(&job, &config));

    tokio::select! {
        joined = handle => match joined {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(CompressError::Cancelled),
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted: {} may hold a partially compressed image", output.display());
            Err(CompressError::Cancelled)
        }
    }
}
