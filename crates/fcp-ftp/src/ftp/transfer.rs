//! Data-channel management for FTP transfers.
//!
//! Passive modes only (RFC 959 + RFC 2428), so the client always opens
//! the data connection and works from behind NAT:
//! - **PASV**: server opens a port, replies with `(h1,h2,h3,h4,p1,p2)`
//! - **EPSV**: server opens a port on the control host, replies `(|||port|)`

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::protocol::FtpCodec;
use crate::ftp::types::DataChannelMode;
use lazy_static::lazy_static;
use regex::Regex;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpStream;

lazy_static! {
    static ref PASV_RE: Regex =
        Regex::new(r"\((\d+),(\d+),(\d+),(\d+),(\d+),(\d+)\)").expect("valid PASV pattern");
    static ref EPSV_RE: Regex = Regex::new(r"\|\|\|(\d+)\|").expect("valid EPSV pattern");
}

/// Open a data channel according to the configured mode.
///
/// Must be called *before* the RETR/STOR command is sent.
pub async fn open_data_channel(
    codec: &mut FtpCodec,
    mode: DataChannelMode,
    host: &str,
) -> FtpResult<TcpStream> {
    match mode {
        DataChannelMode::Passive => open_pasv(codec).await,
        DataChannelMode::ExtendedPassive => open_epsv(codec, host).await,
    }
}

// ─── PASV ────────────────────────────────────────────────────────────

async fn open_pasv(codec: &mut FtpCodec) -> FtpResult<TcpStream> {
    let resp = codec.expect_ok("PASV").await?;
    let addr = parse_pasv_response(&resp.text())?;
    TcpStream::connect(addr)
        .await
        .map_err(|e| FtpError::data_channel(format!("PASV data connect to {}: {}", addr, e)))
}

/// Parse `(h1,h2,h3,h4,p1,p2)` from a 227 response.
pub fn parse_pasv_response(text: &str) -> FtpResult<SocketAddr> {
    let caps = PASV_RE
        .captures(text)
        .ok_or_else(|| FtpError::protocol_error(format!("Cannot parse PASV: {}", text)))?;

    let nums: Vec<u8> = (1..=6)
        .map(|i| {
            caps[i]
                .parse::<u8>()
                .map_err(|_| FtpError::protocol_error("PASV number out of range"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ip = IpAddr::from([nums[0], nums[1], nums[2], nums[3]]);
    let port = (nums[4] as u16) * 256 + (nums[5] as u16);
    Ok(SocketAddr::new(ip, port))
}

// ─── EPSV ────────────────────────────────────────────────────────────

async fn open_epsv(codec: &mut FtpCodec, host: &str) -> FtpResult<TcpStream> {
    let resp = codec.expect_ok("EPSV").await?;
    let port = parse_epsv_response(&resp.text())?;
    let addr = format!("{}:{}", host, port);
    TcpStream::connect(&addr)
        .await
        .map_err(|e| FtpError::data_channel(format!("EPSV data connect to {}: {}", addr, e)))
}

/// Parse `(|||port|)` from a 229 response.
pub fn parse_epsv_response(text: &str) -> FtpResult<u16> {
    let caps = EPSV_RE
        .captures(text)
        .ok_or_else(|| FtpError::protocol_error(format!("Cannot parse EPSV: {}", text)))?;
    caps[1]
        .parse::<u16>()
        .map_err(|_| FtpError::protocol_error("EPSV port out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pasv() {
        let addr = parse_pasv_response("227 Entering Passive Mode (192,168,1,20,195,80)").unwrap();
        assert_eq!(addr, "192.168.1.20:50000".parse().unwrap());
    }

    #[test]
    fn test_parse_pasv_rejects_garbage() {
        assert!(parse_pasv_response("227 Entering Passive Mode").is_err());
        assert!(parse_pasv_response("227 (300,1,1,1,1,1)").is_err());
    }

    #[test]
    fn test_parse_epsv() {
        assert_eq!(
            parse_epsv_response("229 Entering Extended Passive Mode (|||6446|)").unwrap(),
            6446
        );
        assert!(parse_epsv_response("229 Entering Extended Passive Mode").is_err());
        assert!(parse_epsv_response("229 (|||70000|)").is_err());
    }
}
