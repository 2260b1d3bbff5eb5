//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per l'uso programmatico
//! della CLI (`--json`).
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio compressione con parametri effettivi
//! - `complete`: Fine compressione con dimensione, qualità e tentativi
//! - `error`: Errore (input, decodifica, encoding, file system)
//!
//! Un messaggio per riga su stdout; i log vanno su stderr.

use crate::compressor::{CompressionResult, QualityAttempt};
use crate::config::CompressionConfig;
use crate::error::CompressError;
use crate::utils::calculate_reduction;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio della compressione
    #[serde(rename = "start")]
    Start {
        input: PathBuf,
        output: PathBuf,
        target_size_kb: u64,
        step: u8,
        initial_quality: u8,
    },

    /// Compressione terminata (anche fuori budget)
    #[serde(rename = "complete")]
    Complete {
        achieved_size_kb: f64,
        achieved_bytes: u64,
        final_quality: u8,
        target_size_kb: f64,
        met_target: bool,
        original_size: u64,
        reduction_percent: f64,
        attempts: Vec<JsonAttempt>,
    },

    /// Errore
    #[serde(rename = "error")]
    Error { kind: String, message: String },
}

/// Singolo tentativo di encoding
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JsonAttempt {
    pub quality: u8,
    pub size_bytes: u64,
}

impl From<&QualityAttempt> for JsonAttempt {
    fn from(attempt: &QualityAttempt) -> Self {
        Self {
            quality: attempt.quality,
            size_bytes: attempt.size_bytes,
        }
    }
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    /// Crea un messaggio di inizio
    pub fn start(
        input: PathBuf,
        output: PathBuf,
        target_size_kb: u64,
        config: &CompressionConfig,
    ) -> Self {
        Self::Start {
            input,
            output,
            target_size_kb,
            step: config.step,
            initial_quality: config.initial_quality,
        }
    }

    /// Crea un messaggio di completamento; `original_size` è la dimensione dell'input
    pub fn complete(result: &CompressionResult, original_size: u64) -> Self {
        Self::Complete {
            achieved_size_kb: result.achieved_size_kb,
            achieved_bytes: result.achieved_bytes,
            final_quality: result.final_quality,
            target_size_kb: result.target_size_kb,
            met_target: result.met_target(),
            original_size,
            reduction_percent: calculate_reduction(original_size, result.achieved_bytes),
            attempts: result.attempts.iter().map(JsonAttempt::from).collect(),
        }
    }

    /// Crea un messaggio di errore
    pub fn error(error: &CompressError) -> Self {
        Self::Error {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}
