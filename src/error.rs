//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `CompressError` enum per categorizzare tutti gli errori possibili
//! - Separa gli errori di input (rilevati prima del core) da quelli del codec
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Input`: Parametri mancanti o non validi (path, target, step, qualità)
//! - `Decode`: Immagine sorgente corrotta o in formato non supportato
//! - `Encode`: Scrittura del file di output fallita
//! - `UnsupportedFormat`: Estensione di output non scrivibile dal codec
//! - `NotFound` / `Io`: Errori del file system durante la misura delle dimensioni
//! - `Config`: File di configurazione non valido
//! - `Cancelled`: Interruzione richiesta dall'utente (Ctrl-C nella CLI)
//!
//! Un target non raggiungibile NON è un errore: il core ritorna comunque un
//! `CompressionResult` e il chiamante usa `met_target()` per decidere.

use std::path::PathBuf;

/// Errors raised while preparing or running a size-targeted compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("{0}")]
    Input(String),

    #[error("Cannot decode image {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot encode image to {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Compression cancelled by user")]
    Cancelled,
}

impl CompressError {
    /// Short label used by the shell when reporting failures
    pub fn kind(&self) -> &'static str {
        match self {
            CompressError::Input(_) => "input",
            CompressError::Decode { .. } => "decode",
            CompressError::Encode { .. } => "encode",
            CompressError::UnsupportedFormat(_) => "unsupported_format",
            CompressError::NotFound(_) => "not_found",
            CompressError::Io(_) => "io",
            CompressError::Config(_) => "config",
            CompressError::Cancelled => "cancelled",
        }
    }
}

pub type Result<T> = std::result::Result<T, CompressError>;
