//! # Presentation Shell Module
//!
//! Confine tra l'interfaccia utente (qui la CLI) e il core di compressione.
//!
//! ## Responsabilità:
//! - Riceve i tre valori grezzi raccolti dall'utente (input, output, target KB)
//! - Li valida in un `CompressionJob` (errori `Input` prima di toccare il core)
//! - Un output senza estensione diventa `.jpg`
//! - Decodifica l'immagine, invoca il compressore e traduce l'esito in una
//!   `Notification` testuale di successo o di errore
//!
//! ## Flusso:
//! ```text
//! ShellInput --parse()--> CompressionJob --run_job()--> Result<CompressionResult>
//!                                                           |
//!                                           Notification::from_outcome()
//! ```
//!
//! Se la decodifica fallisce il core non viene mai chiamato e il file di
//! destinazione non viene creato.

use crate::codec::{ImageCodec, ImageCrateCodec};
use crate::compressor::{CompressionRequest, CompressionResult, SizeTargetedCompressor};
use crate::config::CompressionConfig;
use crate::error::{CompressError, Result};
use crate::file_system::{FileSystem, LocalFileSystem};
use std::path::PathBuf;
use tracing::debug;

/// Raw values as typed by the user
#[derive(Debug, Clone, Default)]
pub struct ShellInput {
    pub input_path: String,
    pub output_path: String,
    pub target_size: String,
}

/// Validated shell input, ready to hand to the compressor
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub target_size_kb: u64,
}

impl ShellInput {
    pub fn new(
        input_path: impl Into<String>,
        output_path: impl Into<String>,
        target_size: impl Into<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            target_size: target_size.into(),
        }
    }

    /// Validate the raw values into a `CompressionJob`
    pub fn parse(&self) -> Result<CompressionJob> {
        let raw_target = self.target_size.trim();
        let target_size_kb: i64 = raw_target.parse().map_err(|_| {
            CompressError::Input(format!(
                "Target size must be a whole number of KB, got '{}'",
                raw_target
            ))
        })?;
        if target_size_kb <= 0 {
            return Err(CompressError::Input(format!(
                "Target size must be greater than 0 KB, got {}",
                target_size_kb
            )));
        }

        let input = self.input_path.trim();
        let output = self.output_path.trim();
        if input.is_empty() || output.is_empty() {
            return Err(CompressError::Input("Input or output path is missing.".to_string()));
        }

        let input = PathBuf::from(input);
        if !input.is_file() {
            return Err(CompressError::Input(format!(
                "Input image not found: {}",
                input.display()
            )));
        }

        // a bare output name becomes a JPEG
        let mut output = PathBuf::from(output);
        if output.extension().is_none() {
            output.set_extension("jpg");
        }

        Ok(CompressionJob {
            input,
            output,
            target_size_kb: target_size_kb as u64,
        })
    }
}

/// Decode the job's input and run it through `compressor`
pub fn run_job_with<C, F>(
    compressor: &SizeTargetedCompressor<C, F>,
    job: &CompressionJob,
    config: &CompressionConfig,
) -> Result<CompressionResult>
where
    C: ImageCodec,
    F: FileSystem,
{
    config.validate()?;
    let image = compressor.codec().decode(&job.input)?;
    debug!("Decoded {}, starting compression", job.input.display());

    let request = CompressionRequest::new(&image, &job.output, job.target_size_kb as f64)
        .with_config(config);
    compressor.compress(&request)
}

/// Run a job with the `image` crate codec on the local disk
pub fn run_job(job: &CompressionJob, config: &CompressionConfig) -> Result<CompressionResult> {
    let compressor = SizeTargetedCompressor::new(ImageCrateCodec, LocalFileSystem);
    run_job_with(&compressor, job, config)
}

/// What the user is told once a job ends
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Success { message: String },
    Failure { message: String },
}

impl Notification {
    /// Translate an outcome into a notification.
    ///
    /// With `strict`, a result that missed its target is reported as a failure
    /// even though the file was written.
    pub fn from_outcome(outcome: &Result<CompressionResult>, strict: bool) -> Self {
        match outcome {
            Ok(result) if strict && !result.met_target() => Self::Failure {
                message: format!(
                    "Target size of {} KB not reachable: best was {:.2} KB with quality={}",
                    result.target_size_kb, result.achieved_size_kb, result.final_quality
                ),
            },
            Ok(result) => Self::Success {
                message: format!(
                    "Image compressed to {:.2} KB with quality={}",
                    result.achieved_size_kb, result.final_quality
                ),
            },
            Err(e) => Self::Failure {
                message: e.to_string(),
            },
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Notification::Success { .. } => "Success",
            Notification::Failure { .. } => "Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success { message } | Notification::Failure { message } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Notification::Success { .. })
    }
}
