//! In-process FTP server for integration tests.
//!
//! Speaks just enough RFC 959 for single-file transfers: USER/PASS, FEAT,
//! TYPE, PASV/EPSV, RETR, STOR, SIZE and QUIT. Files live in memory. A few
//! switches make RETR and SIZE misbehave on purpose.

#![allow(dead_code)]

use fcp_ftp::ftp::FtpConnectionConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpListener;

/// How RETR misbehaves after sending the first `n` bytes.
#[derive(Clone, Copy)]
enum RetrCut {
    /// Close the data connection and answer 426.
    Abort(usize),
    /// Keep the data connection open and never send another byte.
    Stall(usize),
}

#[derive(Default)]
struct State {
    users: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    commands: Vec<String>,
    logins: Vec<String>,
    quits: usize,
    lie_about_size: bool,
    hide_size: bool,
    refuse_size: bool,
    retr_cut: Option<RetrCut>,
}

#[derive(Clone)]
pub struct FakeFtpServer {
    pub port: u16,
    state: Arc<Mutex<State>>,
}

impl FakeFtpServer {
    pub async fn start(users: &[(&str, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State {
            users: users
                .iter()
                .map(|(u, p)| (u.to_string(), p.to_string()))
                .collect(),
            ..State::default()
        }));

        let shared = state.clone();
        tokio::spawn(async move {
            while let Ok((sock, _)) = listener.accept().await {
                let state = shared.clone();
                tokio::spawn(async move {
                    let _ = serve(sock, state).await;
                });
            }
        });

        Self { port, state }
    }

    pub fn config(&self, username: &str, password: &str) -> FtpConnectionConfig {
        FtpConnectionConfig::new("127.0.0.1", self.port, username, password)
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

    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn logins(&self) -> Vec<String> {
        self.state.lock().unwrap().logins.clone()
    }

    pub fn quits(&self) -> usize {
        self.state.lock().unwrap().quits
    }

    /// Answer SIZE with one byte more than the stored file.
    pub fn lie_about_size(&self) {
        self.state.lock().unwrap().lie_about_size = true;
    }

    /// Advertise SIZE but answer it with 550.
    pub fn refuse_size(&self) {
        self.state.lock().unwrap().refuse_size = true;
    }

    /// Send `n` bytes of every RETR, then drop the data connection and
    /// reply 426.
    pub fn abort_retr_after(&self, n: usize) {
        self.state.lock().unwrap().retr_cut = Some(RetrCut::Abort(n));
    }

    /// Send `n` bytes of every RETR, then go silent.
    pub fn stall_retr_after(&self, n: usize) {
        self.state.lock().unwrap().retr_cut = Some(RetrCut::Stall(n));
    }

    /// Leave SIZE out of FEAT.
    pub fn hide_size(&self) {
        self.state.lock().unwrap().hide_size = true;
    }
}

async fn reply(wr: &mut OwnedWriteHalf, text: &str) -> std::io::Result<()> {
    wr.write_all(format!("{}\r\n", text).as_bytes()).await
}

async fn serve(sock: tokio::net::TcpStream, state: Arc<Mutex<State>>) -> std::io::Result<()> {
    let (rd, mut wr) = sock.into_split();
    let mut rd = BufReader::new(rd);
    reply(&mut wr, "220 fake ftpd ready").await?;

    let mut pending_user: Option<String> = None;
    let mut authed = false;
    let mut passive: Option<TcpListener> = None;

    loop {
        let mut line = String::new();
        if rd.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let line = line.trim_end().to_string();
        let (cmd, arg) = match line.split_once(' ') {
            Some((c, a)) => (c.to_uppercase(), a.to_string()),
            None => (line.to_uppercase(), String::new()),
        };
        state.lock().unwrap().commands.push(cmd.clone());

        match cmd.as_str() {
            "USER" => {
                pending_user = Some(arg);
                reply(&mut wr, "331 Password required").await?;
            }
            "PASS" => {
                let user = pending_user.take().unwrap_or_default();
                let ok = state.lock().unwrap().users.get(&user) == Some(&arg);
                if ok {
                    authed = true;
                    state.lock().unwrap().logins.push(user);
                    reply(&mut wr, "230 Login successful.").await?;
                } else {
                    reply(&mut wr, "530 Login incorrect.").await?;
                }
            }
            "QUIT" => {
                state.lock().unwrap().quits += 1;
                reply(&mut wr, "221 Goodbye.").await?;
                return Ok(());
            }
            _ if !authed => {
                reply(&mut wr, "530 Please login with USER and PASS.").await?;
            }
            "FEAT" => {
                let hide = state.lock().unwrap().hide_size;
                let size = if hide { "" } else { " SIZE\r\n" };
                let text = format!("211-Features:\r\n{} EPSV\r\n UTF8\r\n211 End", size);
                reply(&mut wr, &text).await?;
            }
            "TYPE" => reply(&mut wr, "200 Switching to Binary mode.").await?,
            "PASV" => {
                let l = TcpListener::bind("127.0.0.1:0").await?;
                let port = l.local_addr()?.port();
                passive = Some(l);
                let text = format!(
                    "227 Entering Passive Mode (127,0,0,1,{},{}).",
                    port / 256,
                    port % 256
                );
                reply(&mut wr, &text).await?;
            }
            "EPSV" => {
                let l = TcpListener::bind("127.0.0.1:0").await?;
                let port = l.local_addr()?.port();
                passive = Some(l);
                let text = format!("229 Entering Extended Passive Mode (|||{}|)", port);
                reply(&mut wr, &text).await?;
            }
            "RETR" => {
                let (data, cut) = {
                    let s = state.lock().unwrap();
                    (s.files.get(&arg).cloned(), s.retr_cut)
                };
                match (data, passive.take()) {
                    (Some(bytes), Some(l)) => {
                        reply(&mut wr, "150 Opening BINARY mode data connection.").await?;
                        let (mut dc, _) = l.accept().await?;
                        match cut {
                            None => {
                                dc.write_all(&bytes).await?;
                                dc.shutdown().await?;
                                drop(dc);
                                reply(&mut wr, "226 Transfer complete.").await?;
                            }
                            Some(RetrCut::Abort(n)) => {
                                dc.write_all(&bytes[..n.min(bytes.len())]).await?;
                                dc.shutdown().await?;
                                drop(dc);
                                reply(&mut wr, "426 Connection closed; transfer aborted.").await?;
                            }
                            Some(RetrCut::Stall(n)) => {
                                dc.write_all(&bytes[..n.min(bytes.len())]).await?;
                                dc.flush().await?;
                                std::future::pending::<()>().await;
                            }
                        }
                    }
                    (None, _) => reply(&mut wr, "550 No such file or directory.").await?,
                    (_, None) => reply(&mut wr, "425 Use PASV first.").await?,
                }
            }
            "STOR" => match passive.take() {
                Some(l) => {
                    reply(&mut wr, "150 Ok to send data.").await?;
                    let (mut dc, _) = l.accept().await?;
                    let mut bytes = Vec::new();
                    dc.read_to_end(&mut bytes).await?;
                    state.lock().unwrap().files.insert(arg, bytes);
                    reply(&mut wr, "226 Transfer complete.").await?;
                }
                None => reply(&mut wr, "425 Use PASV first.").await?,
            },
            "SIZE" => {
                let (len, lie, refuse) = {
                    let s = state.lock().unwrap();
                    (s.files.get(&arg).map(|f| f.len()), s.lie_about_size, s.refuse_size)
                };
                match len {
                    Some(_) if refuse => reply(&mut wr, "550 SIZE not allowed.").await?,
                    Some(n) => {
                        let n = if lie { n + 1 } else { n };
                        reply(&mut wr, &format!("213 {}", n)).await?;
                    }
                    None => reply(&mut wr, "550 Could not get file size.").await?,
                }
            }
            _ => reply(&mut wr, "502 Command not implemented.").await?,
        }
    }
}
