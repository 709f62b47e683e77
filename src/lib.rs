//! # filecopier
//!
//! Moves one file to or from a remote server over FTP or SFTP and reports
//! how it went. Every call opens its own session and closes it before
//! returning.
//!
//! The boolean helpers mirror the simplest use: `true` when the whole file
//! arrived. [`execute`] takes a [`TransferJob`] and returns the full
//! [`TransferOutcome`].

pub mod job;

use std::sync::Arc;

pub use fcp_core::{
    LogReporter, MemoryReporter, Protocol, TransferClient, TransferDirection, TransferError,
    TransferErrorKind, TransferEvent, TransferOptions, TransferOutcome, TransferPhase,
    TransferReporter, TransferRequest,
};
pub use fcp_ftp::ftp::{DataChannelMode, FtpConnectionConfig, FtpTransferClient};
pub use fcp_sftp::sftp::{HostKeyPolicy, SftpConnectionConfig, SftpTransferClient};
pub use job::{ConfigError, ConnectionBlock, TransferJob};

/// Run a job with the given reporter.
pub async fn execute(job: &TransferJob, reporter: Arc<dyn TransferReporter>) -> TransferOutcome {
    match &job.connection {
        ConnectionBlock::Ftp(config) => {
            FtpTransferClient::new(config.clone())
                .with_options(job.options.clone())
                .with_reporter(reporter)
                .execute(&job.request)
                .await
        }
        ConnectionBlock::Sftp(config) => {
            SftpTransferClient::new(config.clone())
                .with_options(job.options.clone())
                .with_reporter(reporter)
                .execute(&job.request)
                .await
        }
    }
}

pub async fn ftp_download(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
    remote_path: &str,
    local_path: &str,
) -> bool {
    FtpTransferClient::new(FtpConnectionConfig::new(host, port, username, password))
        .download(remote_path, local_path)
        .await
        .into()
}

pub async fn ftp_upload(
    host: &str,
    port: u16,
    username: &str,
    password: &str,
    local_path: &str,
    remote_path: &str,
) -> bool {
    FtpTransferClient::new(FtpConnectionConfig::new(host, port, username, password))
        .upload(local_path, remote_path)
        .await
        .into()
}

/// `passphrase` may be `None` or empty for an unencrypted key.
pub async fn sftp_download(
    host: &str,
    port: u16,
    username: &str,
    private_key_path: &str,
    passphrase: Option<&str>,
    remote_path: &str,
    local_path: &str,
) -> bool {
    sftp_client(host, port, username, private_key_path, passphrase)
        .download(remote_path, local_path)
        .await
        .into()
}

pub async fn sftp_upload(
    host: &str,
    port: u16,
    username: &str,
    private_key_path: &str,
    passphrase: Option<&str>,
    local_path: &str,
    remote_path: &str,
) -> bool {
    sftp_client(host, port, username, private_key_path, passphrase)
        .upload(local_path, remote_path)
        .await
        .into()
}

fn sftp_client(
    host: &str,
    port: u16,
    username: &str,
    private_key_path: &str,
    passphrase: Option<&str>,
) -> SftpTransferClient {
    SftpTransferClient::new(
        SftpConnectionConfig::new(host, port, username, private_key_path)
            .with_passphrase(passphrase.map(str::to_string)),
    )
}
