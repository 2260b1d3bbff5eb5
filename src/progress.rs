//! # Progress Module
//!
//! Spinner `indicatif` mostrato mentre la compressione (bloccante) gira su un
//! thread dedicato. Il numero di tentativi non è noto a priori, quindi niente
//! barra di progresso: solo uno spinner con messaggio.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a compression is running
pub struct CompressionSpinner {
    bar: ProgressBar,
}

impl CompressionSpinner {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();

        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            bar.set_style(style);
        }

        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Spinner that draws nothing (used with `--json`)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}
