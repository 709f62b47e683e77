//! Blocking single-file download / upload through an open SFTP channel.

use crate::sftp::error::{SftpError, SftpResult};
use fcp_core::transfer::local::{self, PartialFile};
use fcp_core::Lifecycle;
use ssh2::{OpenFlags, OpenType, Sftp};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

const CHUNK: usize = 64 * 1024;
const UPLOAD_MODE: i32 = 0o644;

/// Download `remote` to the path guarded by `partial`. The remote file is
/// opened before anything is created locally; the guard is armed as soon
/// as the local file exists.
pub fn download(
    sftp: &Sftp,
    remote: &str,
    partial: &mut PartialFile,
    lc: &Lifecycle,
) -> SftpResult<u64> {
    let mut src = sftp
        .open(Path::new(remote))
        .map_err(|e| SftpError::Remote(format!("open {}: {}", remote, e)))?;

    let local_path = partial.path().to_path_buf();
    if let Some(dir) = local::ensure_parent_dir(&local_path)
        .map_err(|e| SftpError::Local(format!("create parent of {}: {}", local_path.display(), e)))?
    {
        lc.directory_created(&dir);
    }

    let mut dst = File::create(&local_path)
        .map_err(|e| SftpError::Local(format!("create {}: {}", local_path.display(), e)))?;
    partial.arm();

    let n = pump(&mut src, &mut dst, lc, remote_read_error, local_write_error)?;
    dst.flush().map_err(local_write_error)?;
    Ok(n)
}

/// Upload `local_path` to `remote`, creating or truncating it with mode 0644.
pub fn upload(sftp: &Sftp, local_path: &Path, remote: &str, lc: &Lifecycle) -> SftpResult<u64> {
    let mut src = File::open(local_path)
        .map_err(|e| SftpError::Local(format!("open {}: {}", local_path.display(), e)))?;

    let mut dst = sftp
        .open_mode(
            Path::new(remote),
            OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
            UPLOAD_MODE,
            OpenType::File,
        )
        .map_err(|e| SftpError::Remote(format!("create {}: {}", remote, e)))?;

    let n = pump(&mut src, &mut dst, lc, local_read_error, remote_write_error)?;
    dst.flush().map_err(remote_write_error)?;
    Ok(n)
}

pub fn remote_size(sftp: &Sftp, remote: &str) -> SftpResult<u64> {
    sftp.stat(Path::new(remote))
        .map_err(|e| SftpError::Remote(format!("stat {}: {}", remote, e)))?
        .size
        .ok_or_else(|| SftpError::Remote(format!("stat {}: server reported no size", remote)))
}

fn pump<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    lc: &Lifecycle,
    read_err: fn(io::Error) -> SftpError,
    write_err: fn(io::Error) -> SftpError,
) -> SftpResult<u64> {
    let mut buf = vec![0u8; CHUNK];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_err(e)),
        };
        writer.write_all(&buf[..n]).map_err(write_err)?;
        total += n as u64;
        lc.progress(total);
    }
    Ok(total)
}

fn remote_read_error(e: io::Error) -> SftpError {
    SftpError::Remote(format!("read: {}", e))
}

fn remote_write_error(e: io::Error) -> SftpError {
    SftpError::Remote(format!("write: {}", e))
}

fn local_read_error(e: io::Error) -> SftpError {
    SftpError::Local(format!("read: {}", e))
}

fn local_write_error(e: io::Error) -> SftpError {
    SftpError::Local(format!("write: {}", e))
}
