//! # filecopier – core
//!
//! Shared contract for the single-file transfer clients:
//!   • Request / outcome / error types common to FTP and SFTP
//!   • The connect → authenticate → configure → transfer → close lifecycle
//!   • Injectable reporting of lifecycle events (no global console output)
//!   • Local filesystem helpers (parent-directory creation, partial cleanup,
//!     SHA-256 checksums)
//!   • The protocol-agnostic `TransferClient` trait

pub mod transfer;

pub use transfer::*;
