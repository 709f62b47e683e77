//! # filecopier – SFTP
//!
//! Single-file SFTP transfers over `ssh2`:
//!   • Public-key identity with optional passphrase
//!   • Host-key checking against an OpenSSH `known_hosts` file
//!   • Download / upload through one SFTP subchannel per call
//!   • Subchannel and session torn down on every path
//!
//! `ssh2` is blocking; each call runs on a `spawn_blocking` worker.

pub mod sftp;
