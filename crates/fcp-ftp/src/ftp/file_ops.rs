//! Streaming single-file RETR / STOR over a passive data channel.

use crate::ftp::error::{FtpError, FtpResult};
use crate::ftp::session::FtpSession;
use fcp_core::transfer::local::{self, PartialFile};
use fcp_core::Lifecycle;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

const CHUNK: usize = 64 * 1024;

/// Download `remote` into the path guarded by `partial`.
///
/// The local parent directory and file are only created once the server
/// has accepted RETR, so a missing remote file leaves nothing behind.
/// Once the file exists the guard is armed; the caller decides whether to
/// keep it.
pub async fn retrieve(
    session: &mut FtpSession,
    remote: &str,
    partial: &mut PartialFile,
    lc: &Lifecycle,
) -> FtpResult<u64> {
    let data = session.open_data_channel().await?;
    session.codec.expect(&format!("RETR {}", remote), 1).await?;

    let local_path = partial.path().to_path_buf();
    if let Some(dir) = local::ensure_parent_dir(&local_path).map_err(|e| {
        FtpError::io_error(format!("Cannot create {}: {}", parent_of(&local_path), e))
    })? {
        lc.directory_created(&dir);
    }

    let mut file = tokio::fs::File::create(&local_path).await.map_err(|e| {
        FtpError::io_error(format!("Cannot create {}: {}", local_path.display(), e))
    })?;
    partial.arm();

    receive(session, data, &mut file, lc).await
}

async fn receive(
    session: &mut FtpSession,
    mut data: TcpStream,
    file: &mut tokio::fs::File,
    lc: &Lifecycle,
) -> FtpResult<u64> {
    let bytes = pump(&mut data, file, lc).await?;
    file.flush().await?;
    drop(data);
    finish_transfer(session).await?;
    Ok(bytes)
}

/// Upload `local_path` to `remote`.
pub async fn store(
    session: &mut FtpSession,
    local_path: &Path,
    remote: &str,
    lc: &Lifecycle,
) -> FtpResult<u64> {
    let mut file = tokio::fs::File::open(local_path).await.map_err(|e| {
        FtpError::io_error(format!("Cannot open {}: {}", local_path.display(), e))
    })?;

    let mut data = session.open_data_channel().await?;
    session.codec.expect(&format!("STOR {}", remote), 1).await?;

    let bytes = pump(&mut file, &mut data, lc).await?;
    data.shutdown().await?;
    drop(data);

    finish_transfer(session).await?;
    Ok(bytes)
}

/// Copy until EOF, reporting the running total after every chunk.
async fn pump<R, W>(reader: &mut R, writer: &mut W, lc: &Lifecycle) -> FtpResult<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; CHUNK];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
        lc.progress(total);
    }
    Ok(total)
}

/// Read the 226 that closes a data transfer.
async fn finish_transfer(session: &mut FtpSession) -> FtpResult<()> {
    let resp = session.codec.read_response().await?;
    if !resp.is_completion() {
        return Err(FtpError::from_reply(resp.code, &resp.text()));
    }
    Ok(())
}

fn parent_of(path: &Path) -> String {
    path.parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
