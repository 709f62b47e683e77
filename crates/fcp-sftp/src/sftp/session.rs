//! One SSH session and its SFTP subchannel, owned by a single transfer call.

use crate::sftp::error::{SftpError, SftpResult};
use crate::sftp::host_key;
use crate::sftp::identity::Identity;
use crate::sftp::types::SftpConnectionConfig;
use log::{debug, info};
use ssh2::{Session, Sftp};
use std::net::TcpStream;

/// Plain blocking TCP connect, no timeout.
pub fn open_tcp(config: &SftpConnectionConfig) -> SftpResult<TcpStream> {
    if config.host.trim().is_empty() {
        return Err(SftpError::Connect("host must not be empty".into()));
    }
    if config.port == 0 {
        return Err(SftpError::Connect("port must be between 1 and 65535".into()));
    }
    TcpStream::connect((config.host.as_str(), config.port))
        .map_err(|e| SftpError::Connect(format!("TCP connect to {}: {}", config.address(), e)))
}

pub struct SftpSession {
    session: Session,
    sftp: Option<Sftp>,
}

impl SftpSession {
    /// Run the SSH handshake over an established TCP stream.
    pub fn handshake(tcp: TcpStream) -> SftpResult<Self> {
        let mut session =
            Session::new().map_err(|e| SftpError::Handshake(format!("session init: {}", e)))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| SftpError::Handshake(e.to_string()))?;
        if let Some(banner) = session.banner() {
            debug!("SSH banner: {}", banner);
        }
        Ok(Self {
            session,
            sftp: None,
        })
    }

    pub fn verify_host_key(&self, config: &SftpConnectionConfig) -> SftpResult<()> {
        host_key::verify(
            &self.session,
            &config.host,
            config.port,
            config.host_key_policy,
            &config.known_hosts_file(),
        )
    }

    pub fn authenticate(&self, username: &str, identity: &Identity) -> SftpResult<()> {
        self.session
            .userauth_pubkey_file(
                username,
                None,
                identity.private_key(),
                identity.passphrase(),
            )
            .map_err(|e| SftpError::Auth(format!("{} (key {})", e, identity.private_key().display())))?;
        if !self.session.authenticated() {
            return Err(SftpError::Auth("server did not accept the key".into()));
        }
        info!("SFTP authenticated as {}", username);
        Ok(())
    }

    pub fn open_sftp(&mut self) -> SftpResult<&Sftp> {
        let sftp = self
            .session
            .sftp()
            .map_err(|e| SftpError::Channel(e.to_string()))?;
        Ok(self.sftp.insert(sftp))
    }

    /// Close the subchannel, then disconnect the session.
    pub fn close(mut self) -> SftpResult<()> {
        drop(self.sftp.take());
        self.session
            .disconnect(None, "Transfer finished", None)
            .map_err(|e| SftpError::Connect(format!("disconnect: {}", e)))
    }
}
