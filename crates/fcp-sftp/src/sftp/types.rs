use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the server's host key is checked against `known_hosts`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum HostKeyPolicy {
    /// The host must already be known with a matching key.
    #[default]
    Strict,
    /// Unknown hosts are recorded; a changed key is still rejected.
    AcceptNew,
    /// Any key is accepted.
    Ignore,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SftpConnectionConfig {
    pub host: String,
    #[serde(default = "default_sftp_port")]
    pub port: u16,
    pub username: String,
    pub private_key_path: String,
    #[serde(default)]
    pub passphrase: Option<String>,
    #[serde(default)]
    pub host_key_policy: HostKeyPolicy,
    /// Defaults to `~/.ssh/known_hosts`.
    #[serde(default)]
    pub known_hosts_path: Option<String>,
}

fn default_sftp_port() -> u16 {
    22
}

impl SftpConnectionConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        private_key_path: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            private_key_path: private_key_path.into(),
            passphrase: None,
            host_key_policy: HostKeyPolicy::default(),
            known_hosts_path: None,
        }
    }

    pub fn with_passphrase(mut self, passphrase: Option<String>) -> Self {
        self.passphrase = passphrase;
        self
    }

    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn known_hosts_file(&self) -> PathBuf {
        match &self.known_hosts_path {
            Some(path) => expand_home(path),
            None => dirs::home_dir()
                .map(|home| home.join(".ssh").join("known_hosts"))
                .unwrap_or_else(|| PathBuf::from(".ssh").join("known_hosts")),
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
