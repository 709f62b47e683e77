//! Private-key identity used for public-key authentication.

use crate::sftp::error::{SftpError, SftpResult};
use crate::sftp::types::expand_home;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

pub struct Identity {
    private_key: PathBuf,
    passphrase: Option<String>,
}

impl Identity {
    /// Build an identity from a key file. An empty passphrase counts as none.
    pub fn from_key_file(path: &str, passphrase: Option<&str>) -> SftpResult<Self> {
        if path.trim().is_empty() {
            return Err(SftpError::Identity("no private key configured".into()));
        }
        let private_key = expand_home(path);
        if !private_key.is_file() {
            return Err(SftpError::Identity(format!(
                "private key {} not found",
                private_key.display()
            )));
        }
        File::open(&private_key).map_err(|e| {
            SftpError::Identity(format!(
                "private key {} unreadable: {}",
                private_key.display(),
                e
            ))
        })?;

        Ok(Self {
            private_key,
            passphrase: passphrase.filter(|p| !p.is_empty()).map(str::to_string),
        })
    }

    pub fn private_key(&self) -> &Path {
        &self.private_key
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("private_key", &self.private_key)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "****"))
            .finish()
    }
}
