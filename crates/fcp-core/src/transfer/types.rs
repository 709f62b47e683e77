// ── Types ─────────────────────────────────────────────────────────────────────

use crate::transfer::error::{TransferError, TransferErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_true() -> bool {
    true
}

// ── Protocol & direction ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Protocol {
    Ftp,
    Sftp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ftp => f.write_str("FTP"),
            Protocol::Sftp => f.write_str("SFTP"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TransferDirection {
    Download,
    Upload,
}

impl fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferDirection::Download => f.write_str("download"),
            TransferDirection::Upload => f.write_str("upload"),
        }
    }
}

// ── Request ──────────────────────────────────────────────────────────────────

/// One file to move. The direction decides which path is the source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub protocol: Protocol,
    pub direction: TransferDirection,
    pub remote_path: String,
    pub local_path: String,
}

impl TransferRequest {
    pub fn download(
        protocol: Protocol,
        remote_path: impl Into<String>,
        local_path: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            direction: TransferDirection::Download,
            remote_path: remote_path.into(),
            local_path: local_path.into(),
        }
    }

    pub fn upload(
        protocol: Protocol,
        local_path: impl Into<String>,
        remote_path: impl Into<String>,
    ) -> Self {
        Self {
            protocol,
            direction: TransferDirection::Upload,
            remote_path: remote_path.into(),
            local_path: local_path.into(),
        }
    }

    pub fn source(&self) -> &str {
        match self.direction {
            TransferDirection::Download => &self.remote_path,
            TransferDirection::Upload => &self.local_path,
        }
    }

    pub fn destination(&self) -> &str {
        match self.direction {
            TransferDirection::Download => &self.local_path,
            TransferDirection::Upload => &self.remote_path,
        }
    }
}

// ── Options ──────────────────────────────────────────────────────────────────

/// Per-call switches shared by both clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferOptions {
    /// Compare remote and local sizes once the data stream is closed.
    #[serde(default = "default_true")]
    pub verify_size: bool,
    /// Hash the local file (SHA-256) after a successful transfer.
    #[serde(default)]
    pub compute_checksum: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            verify_size: true,
            compute_checksum: false,
        }
    }
}

// ── Outcome ──────────────────────────────────────────────────────────────────

/// Final result of one transfer call. Either the whole file moved or the
/// call failed; there is no partial success.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub transfer_id: String,
    pub protocol: Protocol,
    pub direction: TransferDirection,
    pub success: bool,
    pub bytes_transferred: u64,
    pub duration_ms: u64,
    /// SHA-256 of the local file, when requested.
    pub checksum: Option<String>,
    pub error: Option<TransferError>,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error_kind(&self) -> Option<TransferErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

impl From<TransferOutcome> for bool {
    fn from(outcome: TransferOutcome) -> bool {
        outcome.success
    }
}
