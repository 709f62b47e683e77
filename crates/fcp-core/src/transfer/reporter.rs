// ── Reporting capability ─────────────────────────────────────────────────────
//
// The clients never print. Lifecycle events go to an injected
// `TransferReporter`; `LogReporter` forwards them to the `log` facade and
// `MemoryReporter` keeps them for inspection.

use crate::transfer::error::TransferError;
use crate::transfer::lifecycle::TransferPhase;
use crate::transfer::types::TransferOutcome;
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub enum TransferEvent {
    Phase(TransferPhase),
    DirectoryCreated(PathBuf),
    /// Running total of bytes moved so far.
    Progress { bytes: u64 },
    TeardownFailed(TransferError),
    Finished(TransferOutcome),
}

pub trait TransferReporter: Send + Sync {
    fn report(&self, transfer_id: &str, event: &TransferEvent);
}

// ── Log-backed reporter ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl TransferReporter for LogReporter {
    fn report(&self, transfer_id: &str, event: &TransferEvent) {
        match event {
            TransferEvent::Phase(phase) => {
                debug!("Transfer {} entered {:?}", transfer_id, phase)
            }
            TransferEvent::DirectoryCreated(path) => {
                info!(
                    "Transfer {} created local directory {}",
                    transfer_id,
                    path.display()
                )
            }
            TransferEvent::Progress { bytes } => {
                trace!("Transfer {} moved {} bytes", transfer_id, bytes)
            }
            TransferEvent::TeardownFailed(err) => {
                warn!("Transfer {} teardown failed: {}", transfer_id, err)
            }
            TransferEvent::Finished(outcome) => match &outcome.error {
                None => info!(
                    "{} {} {} completed: {} bytes in {} ms",
                    outcome.protocol,
                    outcome.direction,
                    transfer_id,
                    outcome.bytes_transferred,
                    outcome.duration_ms
                ),
                Some(err) => error!(
                    "{} {} {} failed: {}",
                    outcome.protocol, outcome.direction, transfer_id, err
                ),
            },
        }
    }
}

// ── In-memory reporter ───────────────────────────────────────────────────────

/// Collects every event in order. Handy for boundary layers that want to
/// attach the event trail to a response, and for tests.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<(String, TransferEvent)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, TransferEvent)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn phases(&self) -> Vec<TransferPhase> {
        self.events()
            .into_iter()
            .filter_map(|(_, e)| match e {
                TransferEvent::Phase(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn count_phase(&self, phase: TransferPhase) -> usize {
        self.phases().into_iter().filter(|p| *p == phase).count()
    }

    pub fn teardown_failures(&self) -> Vec<TransferError> {
        self.events()
            .into_iter()
            .filter_map(|(_, e)| match e {
                TransferEvent::TeardownFailed(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    pub fn created_directories(&self) -> Vec<PathBuf> {
        self.events()
            .into_iter()
            .filter_map(|(_, e)| match e {
                TransferEvent::DirectoryCreated(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn outcomes(&self) -> Vec<TransferOutcome> {
        self.events()
            .into_iter()
            .filter_map(|(_, e)| match e {
                TransferEvent::Finished(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl TransferReporter for MemoryReporter {
    fn report(&self, transfer_id: &str, event: &TransferEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push((transfer_id.to_string(), event.clone()));
        }
    }
}
