//! # Utility Functions Module
//!
//! Size helpers shared by the compressor and the shell. All kilobyte values
//! in this crate are binary (1 KB = 1024 bytes).

pub const BYTES_PER_KB: f64 = 1024.0;

/// Convert a byte count to binary kilobytes
pub fn bytes_to_kb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_KB
}

/// Human-readable size in binary units, as shown when a compression finishes
pub fn format_size(bytes: u64) -> String {
    let kb = bytes_to_kb(bytes);
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if kb < BYTES_PER_KB {
        format!("{:.2} KB", kb)
    } else {
        format!("{:.2} MB", kb / BYTES_PER_KB)
    }
}

/// Calculate percentage reduction
pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
    if original_size == 0 {
        0.0
    } else {
        ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
    }
}
