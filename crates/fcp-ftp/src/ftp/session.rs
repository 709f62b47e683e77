//! One live FTP control session.
//!
//! A session belongs to exactly one transfer call. It is created by
//! [`FtpSession::connect`], driven through login and configuration, and
//! consumed by [`FtpSession::quit`].

use crate::ftp::connection;
use crate::ftp::error::{FtpError, FtpErrorKind, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::transfer;
use crate::ftp::types::{DataChannelMode, FtpConnectionConfig, FtpResponse, ServerFeatures};
use log::{debug, info};
use tokio::net::TcpStream;

/// Replies tolerated after QUIT before giving up on a clean 221.
const QUIT_REPLY_BUDGET: usize = 4;

pub struct FtpSession {
    pub(crate) codec: FtpCodec,
    host: String,
    mode: DataChannelMode,
    pub banner: FtpResponse,
    pub features: ServerFeatures,
}

impl FtpSession {
    /// Open the control connection and read the welcome banner.
    pub async fn connect(config: &FtpConnectionConfig) -> FtpResult<Self> {
        let (codec, banner) = connection::connect(config).await?;
        debug!("FTP banner from {}: {}", config.address(), banner.text());
        Ok(Self {
            codec,
            host: config.host.clone(),
            mode: config.data_channel_mode,
            banner,
            features: ServerFeatures::default(),
        })
    }

    /// USER / PASS.
    pub async fn login(&mut self, username: &str, password: &str) -> FtpResult<()> {
        let resp = self.codec.execute(&format!("USER {}", username)).await?;
        let resp = if resp.code == 331 {
            self.codec.execute(&format!("PASS {}", password)).await?
        } else {
            resp
        };

        // Any refusal at this stage counts as a failed login, whatever the code.
        if !resp.is_completion() {
            return Err(
                FtpError::auth_failed(format!("Login rejected: {}", resp.text()))
                    .with_code(resp.code),
            );
        }

        info!("FTP logged in as {}", username);
        Ok(())
    }

    /// Binary mode plus a best-effort FEAT probe.
    pub async fn configure(&mut self) -> FtpResult<()> {
        self.codec.expect_ok("TYPE I").await?;

        let feat = self.codec.execute("FEAT").await?;
        if feat.is_completion() {
            self.features = ServerFeatures::from_feat_lines(&feat.lines);
        } else {
            debug!("FEAT not supported ({}), assuming minimal server", feat.code);
        }
        Ok(())
    }

    /// Remote file size in bytes (RFC 3659).
    pub async fn size(&mut self, path: &str) -> FtpResult<u64> {
        let resp = self.codec.expect_ok(&format!("SIZE {}", path)).await?;
        resp.lines
            .last()
            .and_then(|l| l.get(4..))
            .and_then(|s| s.trim().parse::<u64>().ok())
            .ok_or_else(|| FtpError::protocol_error(format!("Cannot parse SIZE: {}", resp.text())))
    }

    /// Open a passive data connection for the next RETR/STOR.
    pub async fn open_data_channel(&mut self) -> FtpResult<TcpStream> {
        transfer::open_data_channel(&mut self.codec, self.mode, &self.host).await
    }

    /// Send QUIT and close the control socket.
    ///
    /// The server may hang up right after QUIT or even before answering;
    /// both count as a clean goodbye. Any other failure is returned so the
    /// caller can report it.
    pub async fn quit(mut self) -> FtpResult<()> {
        let result = self.send_quit().await;
        if let Err(e) = self.codec.shutdown().await {
            debug!("FTP control shutdown: {}", e);
        }
        result
    }

    async fn send_quit(&mut self) -> FtpResult<()> {
        self.codec.send_command("QUIT").await?;
        for _ in 0..QUIT_REPLY_BUDGET {
            match self.codec.read_response().await {
                Ok(resp) if resp.is_completion() => return Ok(()),
                // Late 226/4xx from an aborted transfer; keep reading.
                Ok(_) => continue,
                Err(e) if e.kind == FtpErrorKind::Disconnected => return Ok(()),
                Err(e) => return Err(e),
            }
        }
        Err(FtpError::protocol_error("No completion reply to QUIT"))
    }
}
