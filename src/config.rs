//! # Configuration Management Module
//!
//! Questo modulo gestisce i parametri di ricerca della compressione.
//!
//! ## Responsabilità:
//! - Definisce la struct `CompressionConfig` con i parametri del loop di qualità
//! - Fornisce validazione dei parametri prima di avviare il core
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati
//!
//! ## Parametri di configurazione:
//! - `step`: Decremento di qualità per ogni tentativo (default: 10)
//! - `initial_quality`: Qualità del primo encode (1-100, default: 85)
//!
//! ## Precedenza:
//! file di configurazione (o default) → override da CLI (`--step`, `--quality`)
//! → validazione. Con `--save-config` i valori effettivi vengono salvati.
//!
//! ## Percorso di default:
//! `~/.image-compressor/config.json`. Se il file non esiste vengono usati i default.
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = CompressionConfig {
//!     step: 5,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::{CompressError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_STEP: u8 = 10;
pub const DEFAULT_INITIAL_QUALITY: u8 = 85;

/// Search parameters for the size-targeting loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Quality decrement applied after each over-budget attempt
    pub step: u8,
    /// Quality used for the first encode (1-100)
    pub initial_quality: u8,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            initial_quality: DEFAULT_INITIAL_QUALITY,
        }
    }
}

impl CompressionConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(CompressError::Input("Quality step must be greater than 0".to_string()));
        }

        if self.initial_quality == 0 || self.initial_quality > 100 {
            return Err(CompressError::Input(
                "Initial quality must be between 1 and 100".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply command-line overrides on top of this config, then validate the result
    pub fn with_overrides(mut self, step: Option<u8>, initial_quality: Option<u8>) -> Result<Self> {
        if let Some(step) = step {
            self.step = step;
        }
        if let Some(quality) = initial_quality {
            self.initial_quality = quality;
        }
        self.validate()?;
        Ok(self)
    }

    /// Effective config for a run: file (or defaults), then overrides.
    ///
    /// `path` falls back to `default_path()`. With `save`, the effective values
    /// are written back to that file.
    pub async fn resolve(
        path: Option<&Path>,
        step: Option<u8>,
        initial_quality: Option<u8>,
        save: bool,
    ) -> Result<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let base = match &path {
            Some(p) => Self::from_file(p).await?,
            None => Self::default(),
        };
        let config = base.with_overrides(step, initial_quality)?;

        if save {
            let path = path.ok_or_else(|| {
                CompressError::Config("No config path given and no home directory found".to_string())
            })?;
            config.save_to_file(&path).await?;
            info!("Saved configuration to {}", path.display());
        }

        Ok(config)
    }

    /// Default config file location under the user's home directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".image-compressor").join("config.json"))
    }

    /// Load configuration from file
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: CompressionConfig = serde_json::from_str(&content)
            .map_err(|e| CompressError::Config(format!("{}: {}", path.display(), e)))?;
        config
            .validate()
            .map_err(|e| CompressError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CompressError::Config(e.to_string()))?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
