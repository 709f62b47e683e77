// ── fcp-sftp / sftp module ───────────────────────────────────────────────────
//
//   • types      – connection config and host-key policy
//   • error      – SftpError and its outcome classification
//   • identity   – private-key identity
//   • host_key   – known_hosts policy decisions
//   • session    – TCP + SSH session + SFTP subchannel
//   • transfer   – blocking download / upload
//   • service    – `SftpTransferClient`

pub mod types;
pub mod error;
pub mod identity;
pub mod host_key;
pub mod session;
pub mod transfer;
pub mod service;

pub use types::*;
pub use error::{SftpError, SftpResult};
pub use identity::Identity;
pub use service::SftpTransferClient;
