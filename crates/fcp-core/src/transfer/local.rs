//! Local filesystem helpers shared by both clients.

use crate::transfer::error::{TransferError, TransferResult};
use log::warn;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Create the parent directory of `path` (recursively) when it is missing.
///
/// Returns the directory when this call had to create it. Safe to call from
/// concurrent transfers targeting the same new directory: `create_dir_all`
/// treats an already-existing directory as success.
pub fn ensure_parent_dir(path: &Path) -> io::Result<Option<PathBuf>> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(None),
    };
    if parent.is_dir() {
        return Ok(None);
    }
    fs::create_dir_all(parent)?;
    Ok(Some(parent.to_path_buf()))
}

/// Remove a partially written download. Best effort.
pub fn remove_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial file {}: {}", path.display(), e),
    }
}

/// Deletes a download target when dropped while armed.
///
/// Arm it once the local file exists and call [`PartialFile::keep`] after
/// every post-transfer check has passed. Early returns, errors and a
/// dropped (cancelled) transfer future all leave the guard armed, so the
/// file goes away with it. A target that was never created is left alone.
#[derive(Debug)]
pub struct PartialFile {
    path: PathBuf,
    armed: bool,
}

impl PartialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            armed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.armed {
            remove_partial(&self.path);
        }
    }
}

pub fn file_len(path: &Path) -> io::Result<u64> {
    Ok(fs::metadata(path)?.len())
}

/// Hex-encoded SHA-256 of a local file.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 65536];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Post-transfer size comparison.
pub fn verify_size(local_bytes: u64, remote_bytes: u64) -> TransferResult<()> {
    if local_bytes == remote_bytes {
        Ok(())
    } else {
        Err(TransferError::transfer(format!(
            "Size mismatch after transfer: local {} bytes, remote {} bytes",
            local_bytes, remote_bytes
        )))
    }
}
