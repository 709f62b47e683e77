//! Single-file FTP transfers (RFC 959, RFC 2428 EPSV, RFC 3659 SIZE).
//!
//! Architecture:
//! - `types` — connection config, replies, server features
//! - `error` — FTP-specific error type and outcome classification
//! - `protocol` — low-level command/response codec
//! - `connection` — TCP control connection + banner
//! - `session` — one live control session (login, TYPE, FEAT, SIZE, QUIT)
//! - `transfer` — passive data channel (PASV/EPSV)
//! - `file_ops` — streaming RETR / STOR
//! - `service` — `FtpTransferClient`, the lifecycle-driving entry point

pub mod types;
pub mod error;
pub mod protocol;
pub mod connection;
pub mod session;
pub mod transfer;
pub mod file_ops;
pub mod service;

pub use types::*;
pub use error::{FtpError, FtpErrorKind, FtpResult};
pub use service::FtpTransferClient;
