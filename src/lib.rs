//! # Image Size Compressor Library
//!
//! Riduce un'immagine sotto un budget di dimensione (in KB) abbassando
//! progressivamente la qualità di encoding.
//!
//! ## Architettura dei moduli:
//! - `compressor`: Loop di ricerca della qualità (il core)
//! - `codec`: Trait `ImageCodec` e implementazione basata sul crate `image`
//! - `file_system`: Trait `FileSystem` per misurare i file scritti
//! - `config`: Parametri di ricerca, validazione e persistenza JSON
//! - `error`: Tipi di errore custom
//! - `shell`: Confine con l'interfaccia utente (validazione input, notifiche)
//! - `json_output`: Eventi JSON per uso programmatico
//! - `progress`: Spinner durante la compressione
//! - `utils`: Conversioni e formattazione dimensioni
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use image_size_compressor::{CompressionRequest, ImageCodec, ImageCrateCodec,
//!     LocalFileSystem, SizeTargetedCompressor};
//!
//! let compressor = SizeTargetedCompressor::new(ImageCrateCodec, LocalFileSystem);
//! let image = compressor.codec().decode(Path::new("photo.png"))?;
//! let result = compressor.compress(&CompressionRequest::new(&image, "photo.jpg", 200.0))?;
//! println!("{:.2} KB at quality {}", result.achieved_size_kb, result.final_quality);
//! ```

pub mod codec;
pub mod compressor;
pub mod config;
pub mod error;
pub mod file_system;
pub mod json_output;
pub mod progress;
pub mod shell;
pub mod utils;

pub use codec::{ImageCodec, ImageCrateCodec};
pub use compressor::{CompressionRequest, CompressionResult, QualityAttempt, SizeTargetedCompressor};
pub use config::CompressionConfig;
pub use error::CompressError;
pub use file_system::{FileSystem, LocalFileSystem};
pub use shell::{CompressionJob, Notification, ShellInput};
