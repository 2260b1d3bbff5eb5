//! # File System Module
//!
//! Astrazione minima sul file system usata dal core per misurare il file
//! appena scritto. Il core non legge mai la dimensione in altro modo: ogni
//! misura passa da qui, così i test possono sostituire l'implementazione.

use crate::error::{CompressError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Measures files written by the codec
pub trait FileSystem {
    /// Size in bytes of the file at `path`
    fn size_in_bytes(&self, path: &Path) -> Result<u64>;
}

/// `FileSystem` backed by the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn size_in_bytes(&self, path: &Path) -> Result<u64> {
        match std::fs::metadata(path) {
            Ok(metadata) => Ok(metadata.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CompressError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
