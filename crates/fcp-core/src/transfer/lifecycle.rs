//! Per-call lifecycle: `Idle → Connecting → Authenticating → Configuring →
//! Transferring → Closing → Done`.
//!
//! A [`Lifecycle`] is created fresh for every transfer call and moves forward
//! only. Any phase may jump to `Closing` through [`Lifecycle::close`], which
//! consumes the lifecycle and freezes the result; the returned [`Closing`]
//! handle can report teardown problems but cannot change the outcome.
//! [`Closing::finish`] enters `Done` and produces the [`TransferOutcome`].

use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::reporter::{TransferEvent, TransferReporter};
use crate::transfer::types::{Protocol, TransferDirection, TransferOutcome, TransferRequest};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TransferPhase {
    Idle,
    Connecting,
    Authenticating,
    Configuring,
    Transferring,
    Closing,
    Done,
}

/// What a successful transfer step hands to [`Lifecycle::close`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferStats {
    pub bytes: u64,
    pub checksum: Option<String>,
}

impl TransferStats {
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes,
            checksum: None,
        }
    }
}

pub struct Lifecycle {
    id: String,
    protocol: Protocol,
    direction: TransferDirection,
    phase: TransferPhase,
    started: Instant,
    reporter: Arc<dyn TransferReporter>,
}

impl Lifecycle {
    pub fn begin(request: &TransferRequest, reporter: Arc<dyn TransferReporter>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            protocol: request.protocol,
            direction: request.direction,
            phase: TransferPhase::Idle,
            started: Instant::now(),
            reporter,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn phase(&self) -> TransferPhase {
        self.phase
    }

    pub fn reporter(&self) -> &Arc<dyn TransferReporter> {
        &self.reporter
    }

    /// Move forward to `phase`. `Closing` and `Done` are only reachable
    /// through [`Lifecycle::close`] and [`Closing::finish`].
    pub fn enter(&mut self, phase: TransferPhase) {
        debug_assert!(
            phase > self.phase && phase < TransferPhase::Closing,
            "invalid transition {:?} -> {:?}",
            self.phase,
            phase
        );
        self.phase = phase;
        self.reporter.report(&self.id, &TransferEvent::Phase(phase));
    }

    pub fn progress(&self, bytes: u64) {
        self.reporter
            .report(&self.id, &TransferEvent::Progress { bytes });
    }

    pub fn directory_created(&self, path: &Path) {
        self.reporter
            .report(&self.id, &TransferEvent::DirectoryCreated(path.to_path_buf()));
    }

    /// Enter `Closing` with the final result of the call.
    pub fn close(self, result: TransferResult<TransferStats>) -> Closing {
        self.reporter
            .report(&self.id, &TransferEvent::Phase(TransferPhase::Closing));
        Closing {
            id: self.id,
            protocol: self.protocol,
            direction: self.direction,
            started: self.started,
            reporter: self.reporter,
            result,
        }
    }
}

/// Teardown handle. The result it carries is final.
pub struct Closing {
    id: String,
    protocol: Protocol,
    direction: TransferDirection,
    started: Instant,
    reporter: Arc<dyn TransferReporter>,
    result: TransferResult<TransferStats>,
}

impl Closing {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn teardown_failed(&self, error: TransferError) {
        self.reporter
            .report(&self.id, &TransferEvent::TeardownFailed(error));
    }

    pub fn finish(self) -> TransferOutcome {
        self.reporter
            .report(&self.id, &TransferEvent::Phase(TransferPhase::Done));

        let duration_ms = self.started.elapsed().as_millis() as u64;
        let outcome = match self.result {
            Ok(stats) => TransferOutcome {
                transfer_id: self.id.clone(),
                protocol: self.protocol,
                direction: self.direction,
                success: true,
                bytes_transferred: stats.bytes,
                duration_ms,
                checksum: stats.checksum,
                error: None,
            },
            Err(error) => TransferOutcome {
                transfer_id: self.id.clone(),
                protocol: self.protocol,
                direction: self.direction,
                success: false,
                bytes_transferred: 0,
                duration_ms,
                checksum: None,
                error: Some(error),
            },
        };

        self.reporter
            .report(&self.id, &TransferEvent::Finished(outcome.clone()));
        outcome
    }
}
