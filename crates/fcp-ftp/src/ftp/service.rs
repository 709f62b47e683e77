//! `FtpTransferClient` drives one FTP session per call through the
//! transfer lifecycle and guarantees it is torn down exactly once.

use crate::ftp::error::FtpError;
use crate::ftp::file_ops;
use crate::ftp::session::FtpSession;
use crate::ftp::types::FtpConnectionConfig;
use async_trait::async_trait;
use fcp_core::transfer::local::{self, PartialFile};
use fcp_core::{
    Lifecycle, LogReporter, Protocol, TransferClient, TransferDirection, TransferError,
    TransferOptions, TransferOutcome, TransferPhase, TransferReporter, TransferRequest,
    TransferResult, TransferStats,
};
use log::debug;
use std::path::Path;
use std::sync::Arc;

pub struct FtpTransferClient {
    config: FtpConnectionConfig,
    options: TransferOptions,
    reporter: Arc<dyn TransferReporter>,
}

impl FtpTransferClient {
    pub fn new(config: FtpConnectionConfig) -> Self {
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

    pub fn config(&self) -> &FtpConnectionConfig {
        &self.config
    }

    async fn run(&self, request: TransferRequest) -> TransferOutcome {
        let mut lc = Lifecycle::begin(&request, self.reporter.clone());
        let mut slot: Option<FtpSession> = None;

        let result = self.drive(&mut lc, &mut slot, &request).await;
        let closing = lc.close(result);

        if let Some(session) = slot.take() {
            if let Err(e) = session.quit().await {
                closing.teardown_failed(e.into_transfer_error(TransferPhase::Closing));
            }
        }

        closing.finish()
    }

    /// Everything up to `Closing`. Any session that got opened is left in
    /// `slot` for the caller to tear down. A downloaded file is only kept
    /// once verification and hashing have both succeeded.
    async fn drive(
        &self,
        lc: &mut Lifecycle,
        slot: &mut Option<FtpSession>,
        request: &TransferRequest,
    ) -> TransferResult<TransferStats> {
        lc.enter(TransferPhase::Connecting);
        let connected = FtpSession::connect(&self.config)
            .await
            .map_err(|e| e.into_transfer_error(lc.phase()))?;
        let session = slot.insert(connected);

        lc.enter(TransferPhase::Authenticating);
        session
            .login(&self.config.username, &self.config.password)
            .await
            .map_err(|e| e.into_transfer_error(lc.phase()))?;

        lc.enter(TransferPhase::Configuring);
        session
            .configure()
            .await
            .map_err(|e| e.into_transfer_error(lc.phase()))?;

        lc.enter(TransferPhase::Transferring);
        let local_path = Path::new(&request.local_path);
        let mut partial = PartialFile::new(local_path);
        let moved = match request.direction {
            TransferDirection::Download => {
                file_ops::retrieve(session, &request.remote_path, &mut partial, lc).await
            }
            TransferDirection::Upload => {
                file_ops::store(session, local_path, &request.remote_path, lc).await
            }
        };
        let bytes = moved.map_err(|e| e.into_transfer_error(lc.phase()))?;

        if self.options.verify_size {
            self.verify(session, request, local_path, lc.phase()).await?;
        }

        let checksum = if self.options.compute_checksum {
            Some(local::sha256_file(local_path).map_err(|e| {
                TransferError::transfer(format!(
                    "Cannot hash {}: {}",
                    local_path.display(),
                    e
                ))
            })?)
        } else {
            None
        };

        partial.keep();
        Ok(TransferStats { bytes, checksum })
    }

    /// Compare the remote SIZE with the local file. Skipped when the
    /// server does not advertise SIZE.
    async fn verify(
        &self,
        session: &mut FtpSession,
        request: &TransferRequest,
        local_path: &Path,
        phase: TransferPhase,
    ) -> TransferResult<()> {
        if !session.features.size {
            debug!("Server lacks SIZE, skipping size verification");
            return Ok(());
        }

        let remote = session
            .size(&request.remote_path)
            .await
            .map_err(|e: FtpError| e.into_transfer_error(phase))?;
        let len = local::file_len(local_path).map_err(TransferError::from)?;
        local::verify_size(len, remote)
    }
}

#[async_trait]
impl TransferClient for FtpTransferClient {
    fn protocol(&self) -> Protocol {
        Protocol::Ftp
    }

    fn reporter(&self) -> Arc<dyn TransferReporter> {
        self.reporter.clone()
    }

    async fn download(&self, remote_path: &str, local_path: &str) -> TransferOutcome {
        self.run(TransferRequest::download(Protocol::Ftp, remote_path, local_path))
            .await
    }

    async fn upload(&self, local_path: &str, remote_path: &str) -> TransferOutcome {
        self.run(TransferRequest::upload(Protocol::Ftp, local_path, remote_path))
            .await
    }
}
