use fcp_core::{TransferError, TransferErrorKind};
use thiserror::Error;

/// Failure at one stage of an SFTP transfer.
#[derive(Debug, Error)]
pub enum SftpError {
    #[error("identity: {0}")]
    Identity(String),
    #[error("connect: {0}")]
    Connect(String),
    #[error("SSH handshake failed: {0}")]
    Handshake(String),
    #[error("host key rejected: {0}")]
    HostKey(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("SFTP channel: {0}")]
    Channel(String),
    #[error("remote: {0}")]
    Remote(String),
    #[error("local: {0}")]
    Local(String),
    #[error("verification: {0}")]
    Verify(String),
}

pub type SftpResult<T> = Result<T, SftpError>;

impl SftpError {
    pub fn outcome_kind(&self) -> TransferErrorKind {
        match self {
            SftpError::Connect(_) => TransferErrorKind::Connection,
            SftpError::Identity(_)
            | SftpError::Handshake(_)
            | SftpError::HostKey(_)
            | SftpError::Auth(_) => TransferErrorKind::Authentication,
            SftpError::Channel(_)
            | SftpError::Remote(_)
            | SftpError::Local(_)
            | SftpError::Verify(_) => TransferErrorKind::Transfer,
        }
    }

    pub fn into_transfer_error(self) -> TransferError {
        TransferError::new(self.outcome_kind(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_classification() {
        let cases = [
            (SftpError::Connect("refused".into()), TransferErrorKind::Connection),
            (SftpError::Identity("no key".into()), TransferErrorKind::Authentication),
            (SftpError::Handshake("kex".into()), TransferErrorKind::Authentication),
            (SftpError::HostKey("mismatch".into()), TransferErrorKind::Authentication),
            (SftpError::Auth("denied".into()), TransferErrorKind::Authentication),
            (SftpError::Channel("subsystem".into()), TransferErrorKind::Transfer),
            (SftpError::Remote("no such file".into()), TransferErrorKind::Transfer),
            (SftpError::Local("disk full".into()), TransferErrorKind::Transfer),
            (SftpError::Verify("size".into()), TransferErrorKind::Transfer),
        ];
        for (err, kind) in cases {
            assert_eq!(err.outcome_kind(), kind, "{}", err);
        }
    }

    #[test]
    fn test_transfer_error_message() {
        let err = SftpError::Remote("open /data/x: no such file".into()).into_transfer_error();
        assert_eq!(err.kind, TransferErrorKind::Transfer);
        assert_eq!(err.message, "remote: open /data/x: no such file");
    }
}
