//! Protocol-agnostic client contract.

use crate::transfer::error::TransferError;
use crate::transfer::lifecycle::Lifecycle;
use crate::transfer::reporter::TransferReporter;
use crate::transfer::types::{Protocol, TransferDirection, TransferOutcome, TransferRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// One implementation per wire protocol. Every call opens its own session,
/// never reuses one, and tears it down before returning. Failures come back
/// inside the [`TransferOutcome`]; nothing is returned as `Err`.
#[async_trait]
pub trait TransferClient: Send + Sync {
    fn protocol(&self) -> Protocol;

    /// Sink for the lifecycle events of every call made through this client.
    fn reporter(&self) -> Arc<dyn TransferReporter>;

    async fn download(&self, remote_path: &str, local_path: &str) -> TransferOutcome;

    async fn upload(&self, local_path: &str, remote_path: &str) -> TransferOutcome;

    async fn execute(&self, request: &TransferRequest) -> TransferOutcome {
        if request.protocol != self.protocol() {
            return Lifecycle::begin(request, self.reporter())
                .close(Err(TransferError::connection(format!(
                    "{} request sent to {} client",
                    request.protocol,
                    self.protocol()
                ))))
                .finish();
        }
        match request.direction {
            TransferDirection::Download => {
                self.download(&request.remote_path, &request.local_path).await
            }
            TransferDirection::Upload => {
                self.upload(&request.local_path, &request.remote_path).await
            }
        }
    }
}
