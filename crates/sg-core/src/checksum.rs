//! SHA-256 fingerprints for raw input immutability checks.

use crate::error::{CoreError, CoreResult};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Compute SHA256 checksum of a byte slice
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Compute SHA256 checksum of a file's contents, streaming it in chunks
pub fn compute_file_checksum(path: &Path) -> CoreResult<String> {
    let with_path = |e: std::io::Error| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    };

    let mut file = std::fs::File::open(path).map_err(with_path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(with_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
