//! Outcome-level error taxonomy shared by both clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorised transfer failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferError {
    pub kind: TransferErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TransferErrorKind {
    /// Host unreachable, port closed, invalid address, network failure
    /// before authentication.
    Connection,
    /// Bad credentials, rejected key, passphrase mismatch, untrusted host.
    Authentication,
    /// I/O failure while streaming, invalid remote path, permission denied,
    /// local disk or directory errors.
    Transfer,
    /// Failure while closing the channel or session. Reported, never
    /// promoted to the call's outcome.
    Teardown,
}

impl fmt::Display for TransferErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransferErrorKind::Connection => "ConnectionError",
            TransferErrorKind::Authentication => "AuthenticationError",
            TransferErrorKind::Transfer => "TransferError",
            TransferErrorKind::Teardown => "TeardownError",
        };
        f.write_str(s)
    }
}

pub type TransferResult<T> = Result<T, TransferError>;

// ── Construction helpers ─────────────────────────────────────────────

impl TransferError {
    pub fn new(kind: TransferErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
        }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::Connection, msg)
    }

    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::Authentication, msg)
    }

    pub fn transfer(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::Transfer, msg)
    }

    pub fn teardown(msg: impl Into<String>) -> Self {
        Self::new(TransferErrorKind::Teardown, msg)
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for TransferError {}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        Self::transfer(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_class() {
        let err = TransferError::authentication("530 Login incorrect.");
        assert_eq!(err.to_string(), "[AuthenticationError] 530 Login incorrect.");
    }

    #[test]
    fn test_io_errors_are_transfer_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: TransferError = io.into();
        assert_eq!(err.kind, TransferErrorKind::Transfer);
        assert!(err.message.contains("disk full"));
    }

    #[test]
    fn test_kind_serializes_camel_case() {
        let err = TransferError::teardown("x");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"kind\":\"teardown\""));
    }
}
