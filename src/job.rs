//! JSON job files: one request, its connection settings, and options.

use fcp_core::{Protocol, TransferOptions, TransferRequest};
use fcp_ftp::ftp::FtpConnectionConfig;
use fcp_sftp::sftp::SftpConnectionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read job file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed job: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{request} request paired with {connection} connection settings")]
    ProtocolMismatch {
        request: Protocol,
        connection: Protocol,
    },
    #[error("invalid job: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionBlock {
    Ftp(FtpConnectionConfig),
    Sftp(SftpConnectionConfig),
}

impl ConnectionBlock {
    pub fn protocol(&self) -> Protocol {
        match self {
            ConnectionBlock::Ftp(_) => Protocol::Ftp,
            ConnectionBlock::Sftp(_) => Protocol::Sftp,
        }
    }

    fn host(&self) -> &str {
        match self {
            ConnectionBlock::Ftp(c) => &c.host,
            ConnectionBlock::Sftp(c) => &c.host,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransferJob {
    pub request: TransferRequest,
    pub connection: ConnectionBlock,
    #[serde(default)]
    pub options: TransferOptions,
}

impl TransferJob {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let job: TransferJob = serde_json::from_str(text)?;
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let connection = self.connection.protocol();
        if self.request.protocol != connection {
            return Err(ConfigError::ProtocolMismatch {
                request: self.request.protocol,
                connection,
            });
        }
        if self.connection.host().trim().is_empty() {
            return Err(ConfigError::Invalid("connection host is empty".into()));
        }
        if self.request.remote_path.trim().is_empty() {
            return Err(ConfigError::Invalid("remotePath is empty".into()));
        }
        if self.request.local_path.trim().is_empty() {
            return Err(ConfigError::Invalid("localPath is empty".into()));
        }
        Ok(())
    }
}
