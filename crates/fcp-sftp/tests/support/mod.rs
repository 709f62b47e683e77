//! In-process SSH server with an SFTP subsystem for integration tests.
//!
//! Accepts public-key logins for a single user (any key), serves files from
//! memory and answers the handful of SFTP requests a single-file transfer
//! makes: OPEN, READ, WRITE, CLOSE and the STAT family.

#![allow(dead_code)]

use async_trait::async_trait;
use fcp_sftp::sftp::{HostKeyPolicy, SftpConnectionConfig};
use russh::server::{self, Auth, Msg, Session};
use russh::{Channel, ChannelId};
use russh_keys::key::{KeyPair, PublicKey};
use russh_sftp::protocol::{
    Attrs, Data, FileAttributes, Handle, OpenFlags, Status, StatusCode, Version,
};
use ssh_key::rand_core::OsRng;
use ssh_key::{Algorithm, LineEnding, PrivateKey};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Default)]
struct State {
    files: HashMap<String, Vec<u8>>,
    logins: Vec<String>,
    hide_size: bool,
}

#[derive(Clone)]
pub struct FakeSftpServer {
    pub port: u16,
    user: String,
    state: Arc<Mutex<State>>,
}

impl FakeSftpServer {
    pub async fn start(user: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));
        let config = Arc::new(server::Config {
            keys: vec![KeyPair::generate_ed25519().unwrap()],
            auth_rejection_time: Duration::from_millis(10),
            ..Default::default()
        });

        let shared = state.clone();
        let allowed = user.to_string();
        tokio::spawn(async move {
            while let Ok((sock, _)) = listener.accept().await {
                let handler = SshHandler {
                    user: allowed.clone(),
                    state: shared.clone(),
                    channels: HashMap::new(),
                };
                let config = config.clone();
                tokio::spawn(async move {
                    if let Ok(running) = server::run_stream(config, sock, handler).await {
                        let _ = running.await;
                    }
                });
            }
        });

        Self {
            port,
            user: user.to_string(),
            state,
        }
    }

    /// Connection settings for `username` with a freshly generated key in
    /// `scratch` and an empty known_hosts file recorded on first contact.
    pub fn config(&self, scratch: &Path, username: &str) -> SftpConnectionConfig {
        let key = client_key(scratch);
        let mut cfg = SftpConnectionConfig::new("127.0.0.1", self.port, username, key)
            .with_host_key_policy(HostKeyPolicy::AcceptNew);
        cfg.known_hosts_path = Some(known_hosts(scratch).to_string_lossy().to_string());
        cfg
    }

    pub fn put(&self, path: &str, data: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), data.to_vec());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub fn logins(&self) -> Vec<String> {
        self.state.lock().unwrap().logins.clone()
    }

    /// Answer STAT without a size attribute.
    pub fn hide_size(&self) {
        self.state.lock().unwrap().hide_size = true;
    }
}

pub fn known_hosts(scratch: &Path) -> PathBuf {
    scratch.join("known_hosts")
}

/// Unencrypted OpenSSH ed25519 key, written once per scratch directory.
pub fn client_key(scratch: &Path) -> String {
    let path = scratch.join("id_ed25519");
    if !path.exists() {
        let key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519).unwrap();
        key.write_openssh_file(&path, LineEnding::LF).unwrap();
    }
    path.to_string_lossy().to_string()
}

struct SshHandler {
    user: String,
    state: Arc<Mutex<State>>,
    channels: HashMap<ChannelId, Channel<Msg>>,
}

#[async_trait]
impl server::Handler for SshHandler {
    type Error = russh::Error;

    async fn auth_publickey(
        &mut self,
        user: &str,
        _public_key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        if user == self.user {
            self.state.lock().unwrap().logins.push(user.to_string());
            Ok(Auth::Accept)
        } else {
            Ok(Auth::Reject {
                proceed_with_methods: None,
            })
        }
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        self.channels.insert(channel.id(), channel);
        Ok(true)
    }

    async fn channel_eof(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        session.close(channel);
        Ok(())
    }

    async fn subsystem_request(
        &mut self,
        channel_id: ChannelId,
        name: &str,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        match (name, self.channels.remove(&channel_id)) {
            ("sftp", Some(channel)) => {
                session.channel_success(channel_id);
                let files = SftpFiles {
                    state: self.state.clone(),
                    handles: HashMap::new(),
                    next_handle: 0,
                };
                russh_sftp::server::run(channel.into_stream(), files).await;
            }
            _ => session.channel_failure(channel_id),
        }
        Ok(())
    }
}

struct SftpFiles {
    state: Arc<Mutex<State>>,
    handles: HashMap<String, String>,
    next_handle: u32,
}

impl SftpFiles {
    fn path_of(&self, handle: &str) -> Result<String, StatusCode> {
        self.handles.get(handle).cloned().ok_or(StatusCode::Failure)
    }

    fn attrs(&self, id: u32, path: &str) -> Result<Attrs, StatusCode> {
        let state = self.state.lock().unwrap();
        let len = state
            .files
            .get(path)
            .map(|f| f.len() as u64)
            .ok_or(StatusCode::NoSuchFile)?;
        let size = if state.hide_size { None } else { Some(len) };
        Ok(Attrs {
            id,
            attrs: FileAttributes {
                size,
                permissions: Some(0o100644),
                ..Default::default()
            },
        })
    }
}

fn ok(id: u32) -> Status {
    Status {
        id,
        status_code: StatusCode::Ok,
        error_message: "Ok".to_string(),
        language_tag: "en-US".to_string(),
    }
}

#[async_trait]
impl russh_sftp::server::Handler for SftpFiles {
    type Error = StatusCode;

    fn unimplemented(&self) -> Self::Error {
        StatusCode::OpUnsupported
    }

    async fn init(
        &mut self,
        _version: u32,
        _extensions: HashMap<String, String>,
    ) -> Result<Version, Self::Error> {
        Ok(Version::new())
    }

    async fn open(
        &mut self,
        id: u32,
        filename: String,
        pflags: OpenFlags,
        _attrs: FileAttributes,
    ) -> Result<Handle, Self::Error> {
        {
            let mut state = self.state.lock().unwrap();
            let exists = state.files.contains_key(&filename);
            if pflags.contains(OpenFlags::WRITE) {
                if pflags.contains(OpenFlags::TRUNCATE)
                    || (!exists && pflags.contains(OpenFlags::CREATE))
                {
                    state.files.insert(filename.clone(), Vec::new());
                } else if !exists {
                    return Err(StatusCode::NoSuchFile);
                }
            } else if !exists {
                return Err(StatusCode::NoSuchFile);
            }
        }

        let handle = format!("h{}", self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle.clone(), filename);
        Ok(Handle { id, handle })
    }

    async fn close(&mut self, id: u32, handle: String) -> Result<Status, Self::Error> {
        self.handles.remove(&handle);
        Ok(ok(id))
    }

    async fn read(
        &mut self,
        id: u32,
        handle: String,
        offset: u64,
        len: u32,
    ) -> Result<Data, Self::Error> {
        let path = self.path_of(&handle)?;
        let state = self.state.lock().unwrap();
        let content = state.files.get(&path).ok_or(StatusCode::NoSuchFile)?;
        let start = offset as usize;
        if start >= content.len() {
            return Err(StatusCode::Eof);
        }
        let end = content.len().min(start + len as usize);
        Ok(Data {
            id,
            data: content[start..end].to_vec(),
        })
    }

    async fn write(
        &mut self,
        id: u32,
        handle: String,
        offset: u64,
        data: Vec<u8>,
    ) -> Result<Status, Self::Error> {
        let path = self.path_of(&handle)?;
        let mut state = self.state.lock().unwrap();
        let content = state.files.entry(path).or_default();
        let start = offset as usize;
        let end = start + data.len();
        if content.len() < end {
            content.resize(end, 0);
        }
        content[start..end].copy_from_slice(&data);
        Ok(ok(id))
    }

    async fn stat(&mut self, id: u32, path: String) -> Result<Attrs, Self::Error> {
        self.attrs(id, &path)
    }

    async fn lstat(&mut self, id: u32, path: String) -> Result<Attrs, Self::Error> {
        self.attrs(id, &path)
    }

    async fn fstat(&mut self, id: u32, handle: String) -> Result<Attrs, Self::Error> {
        let path = self.path_of(&handle)?;
        self.attrs(id, &path)
    }
}
