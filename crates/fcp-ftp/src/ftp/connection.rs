//! TCP transport for the FTP control connection.
//!
//! No connect timeout is applied; callers that need a bound wrap the
//! whole transfer call in their own deadline.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::types::{FtpConnectionConfig, FtpResponse};
use tokio::net::TcpStream;

/// Establish the control connection and return a ready-to-use codec
/// **plus** the server welcome banner.
pub async fn connect(config: &FtpConnectionConfig) -> FtpResult<(FtpCodec, FtpResponse)> {
    validate(config)?;

    let addr = config.address();
    let tcp = TcpStream::connect(&addr)
        .await
        .map_err(|e| FtpError::connection_failed(format!("TCP connect to {}: {}", addr, e)))?;

    tcp.set_nodelay(true).ok();

    let mut codec = FtpCodec::from_tcp(tcp);
    let mut banner = codec.read_response().await?;

    // 120: service ready in nnn minutes; the real greeting follows.
    while banner.is_preliminary() {
        banner = codec.read_response().await?;
    }
    if !banner.is_completion() {
        return Err(FtpError::connection_failed(format!(
            "Server refused service: {}",
            banner.text()
        ))
        .with_code(banner.code));
    }

    Ok((codec, banner))
}

/// Reject parameters that cannot possibly reach a server.
pub fn validate(config: &FtpConnectionConfig) -> FtpResult<()> {
    if config.host.trim().is_empty() {
        return Err(FtpError::invalid_config("Host must not be empty"));
    }
    if config.port == 0 {
        return Err(FtpError::invalid_config("Port must be between 1 and 65535"));
    }
    Ok(())
}
