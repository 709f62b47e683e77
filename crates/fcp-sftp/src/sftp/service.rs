//! `SftpTransferClient`: one SSH session per call, run on a blocking
//! worker, torn down before the call returns.

use crate::sftp::error::{SftpError, SftpResult};
use crate::sftp::identity::Identity;
use crate::sftp::session::{self, SftpSession};
use crate::sftp::transfer;
use crate::sftp::types::SftpConnectionConfig;
use async_trait::async_trait;
use fcp_core::transfer::local::{self, PartialFile};
use fcp_core::{
    Lifecycle, LogReporter, Protocol, TransferClient, TransferDirection, TransferError,
    TransferOptions, TransferOutcome, TransferPhase, TransferReporter, TransferRequest,
    TransferStats,
};
use log::info;
use std::path::Path;
use std::sync::Arc;

pub struct SftpTransferClient {
    config: SftpConnectionConfig,
    options: TransferOptions,
    reporter: Arc<dyn TransferReporter>,
}

impl SftpTransferClient {
    pub fn new(config: SftpConnectionConfig) -> Self {
        Self {
            config,
            options: TransferOptions::default(),
            reporter: Arc::new(LogReporter),
        }
    }

    pub fn with_options(mut self, options: TransferOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn TransferReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &SftpConnectionConfig {
        &self.config
    }

    async fn run(&self, request: TransferRequest) -> TransferOutcome {
        let config = self.config.clone();
        let options = self.options.clone();
        let reporter = self.reporter.clone();
        let job = request.clone();

        match tokio::task::spawn_blocking(move || run_blocking(&config, &options, &job, reporter))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => Lifecycle::begin(&request, self.reporter.clone())
                .close(Err(TransferError::transfer(format!(
                    "SFTP worker did not complete: {}",
                    e
                ))))
                .finish(),
        }
    }
}

fn run_blocking(
    config: &SftpConnectionConfig,
    options: &TransferOptions,
    request: &TransferRequest,
    reporter: Arc<dyn TransferReporter>,
) -> TransferOutcome {
    let mut lc = Lifecycle::begin(request, reporter);
    let mut slot: Option<SftpSession> = None;

    let result = drive(config, options, request, &mut lc, &mut slot)
        .map_err(SftpError::into_transfer_error);
    let closing = lc.close(result);

    if let Some(session) = slot.take() {
        if let Err(e) = session.close() {
            closing.teardown_failed(TransferError::teardown(e.to_string()));
        }
    }

    closing.finish()
}

/// Everything up to `Closing`. A session that completed its handshake is
/// left in `slot` for teardown; a downloaded file survives only a fully
/// successful run.
fn drive(
    config: &SftpConnectionConfig,
    options: &TransferOptions,
    request: &TransferRequest,
    lc: &mut Lifecycle,
    slot: &mut Option<SftpSession>,
) -> SftpResult<TransferStats> {
    lc.enter(TransferPhase::Connecting);
    let identity = Identity::from_key_file(&config.private_key_path, config.passphrase.as_deref())?;
    let tcp = session::open_tcp(config)?;
    info!("SFTP connected to {}", config.address());

    lc.enter(TransferPhase::Authenticating);
    let session = slot.insert(SftpSession::handshake(tcp)?);
    session.verify_host_key(config)?;
    session.authenticate(&config.username, &identity)?;

    lc.enter(TransferPhase::Configuring);
    let sftp = session.open_sftp()?;

    lc.enter(TransferPhase::Transferring);
    let local_path = Path::new(&request.local_path);
    let mut partial = PartialFile::new(local_path);
    let bytes = match request.direction {
        TransferDirection::Download => {
            transfer::download(sftp, &request.remote_path, &mut partial, lc)?
        }
        TransferDirection::Upload => transfer::upload(sftp, local_path, &request.remote_path, lc)?,
    };

    if options.verify_size {
        let remote = transfer::remote_size(sftp, &request.remote_path)?;
        let len = local::file_len(local_path)
            .map_err(|e| SftpError::Local(format!("stat {}: {}", local_path.display(), e)))?;
        local::verify_size(len, remote).map_err(|e| SftpError::Verify(e.message))?;
    }

    let checksum = if options.compute_checksum {
        Some(local::sha256_file(local_path).map_err(|e| {
            SftpError::Local(format!("hash {}: {}", local_path.display(), e))
        })?)
    } else {
        None
    };

    partial.keep();
    Ok(TransferStats { bytes, checksum })
}

#[async_trait]
impl TransferClient for SftpTransferClient {
    fn protocol(&self) -> Protocol {
        Protocol::Sftp
    }

    fn reporter(&self) -> Arc<dyn TransferReporter> {
        self.reporter.clone()
    }

    async fn download(&self, remote_path: &str, local_path: &str) -> TransferOutcome {
        self.run(TransferRequest::download(Protocol::Sftp, remote_path, local_path))
            .await
    }

    async fn upload(&self, local_path: &str, remote_path: &str) -> TransferOutcome {
        self.run(TransferRequest::upload(Protocol::Sftp, local_path, remote_path))
            .await
    }
}
