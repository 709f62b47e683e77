//! Host-key checking against an OpenSSH `known_hosts` file.

use crate::sftp::error::{SftpError, SftpResult};
use crate::sftp::types::HostKeyPolicy;
use log::{info, warn};
use ssh2::{CheckResult, HostKeyType, KnownHostFileKind, Session};
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// What `known_hosts` says about the presented key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownHostStatus {
    Match,
    Mismatch,
    NotFound,
    Failure,
}

impl From<CheckResult> for KnownHostStatus {
    fn from(result: CheckResult) -> Self {
        match result {
            CheckResult::Match => KnownHostStatus::Match,
            CheckResult::Mismatch => KnownHostStatus::Mismatch,
            CheckResult::NotFound => KnownHostStatus::NotFound,
            CheckResult::Failure => KnownHostStatus::Failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyDecision {
    Accept,
    /// Accept and append the key to `known_hosts`.
    Record,
    Reject(&'static str),
}

pub fn decide(policy: HostKeyPolicy, status: KnownHostStatus) -> HostKeyDecision {
    match (policy, status) {
        (HostKeyPolicy::Ignore, _) => HostKeyDecision::Accept,
        (_, KnownHostStatus::Match) => HostKeyDecision::Accept,
        (_, KnownHostStatus::Mismatch) => {
            HostKeyDecision::Reject("host key does not match known_hosts")
        }
        (_, KnownHostStatus::Failure) => HostKeyDecision::Reject("known_hosts check failed"),
        (HostKeyPolicy::AcceptNew, KnownHostStatus::NotFound) => HostKeyDecision::Record,
        (HostKeyPolicy::Strict, KnownHostStatus::NotFound) => {
            HostKeyDecision::Reject("host is not in known_hosts")
        }
    }
}

/// `known_hosts` spelling of a host: bare on port 22, `[host]:port` otherwise.
pub fn host_entry(host: &str, port: u16) -> String {
    if port == 22 {
        host.to_string()
    } else {
        format!("[{}]:{}", host, port)
    }
}

/// Check the key presented during the handshake of `session`.
pub fn verify(
    session: &Session,
    host: &str,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts: &Path,
) -> SftpResult<()> {
    if policy == HostKeyPolicy::Ignore {
        warn!("Host key checking disabled for {}", host_entry(host, port));
        return Ok(());
    }

    let (key, key_type) = session
        .host_key()
        .ok_or_else(|| SftpError::HostKey("server presented no host key".into()))?;

    let mut hosts = session
        .known_hosts()
        .map_err(|e| SftpError::HostKey(format!("known_hosts init: {}", e)))?;
    if known_hosts.is_file() {
        hosts
            .read_file(known_hosts, KnownHostFileKind::OpenSSH)
            .map_err(|e| {
                SftpError::HostKey(format!("reading {}: {}", known_hosts.display(), e))
            })?;
    }

    let status = KnownHostStatus::from(hosts.check_port(host, port, key));
    match decide(policy, status) {
        HostKeyDecision::Accept => Ok(()),
        HostKeyDecision::Record => {
            let entry = host_entry(host, port);
            let line = entry_line(session, &entry, key, key_type)?;
            append_entry(known_hosts, &line).map_err(|e| {
                SftpError::HostKey(format!("writing {}: {}", known_hosts.display(), e))
            })?;
            info!("Recorded new host key for {} in {}", entry, known_hosts.display());
            Ok(())
        }
        HostKeyDecision::Reject(reason) => Err(SftpError::HostKey(format!(
            "{} ({})",
            reason,
            host_entry(host, port)
        ))),
    }
}

/// Render one OpenSSH `known_hosts` line for `entry` through a scratch
/// collection, so the file on disk is never parsed and rewritten.
fn entry_line(
    session: &Session,
    entry: &str,
    key: &[u8],
    key_type: HostKeyType,
) -> SftpResult<String> {
    let mut scratch = session
        .known_hosts()
        .map_err(|e| SftpError::HostKey(format!("known_hosts init: {}", e)))?;
    scratch
        .add(entry, key, "added by filecopier", key_type.into())
        .map_err(|e| SftpError::HostKey(format!("recording {}: {}", entry, e)))?;
    let hosts = scratch
        .iter()
        .map_err(|e| SftpError::HostKey(format!("recording {}: {}", entry, e)))?;
    let host = hosts
        .first()
        .ok_or_else(|| SftpError::HostKey(format!("recording {}: entry not stored", entry)))?;
    scratch
        .write_string(host, KnownHostFileKind::OpenSSH)
        .map_err(|e| SftpError::HostKey(format!("formatting {}: {}", entry, e)))
}

/// Append a single line to `path`, creating the file and its directory when
/// missing. Existing lines, comments included, are not touched. The line
/// goes out in one `O_APPEND` write so concurrent recorders do not clobber
/// each other.
pub(crate) fn append_entry(path: &Path, line: &str) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let mut file = OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)?;

    let mut record = String::with_capacity(line.len() + 2);
    if missing_final_newline(&mut file)? {
        record.push('\n');
    }
    record.push_str(line.trim_end());
    record.push('\n');
    file.write_all(record.as_bytes())
}

fn missing_final_newline(file: &mut fs::File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
