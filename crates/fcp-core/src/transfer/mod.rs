// ── fcp-core / transfer module ───────────────────────────────────────────────
//
// Everything both protocol clients agree on:
//   • types      – protocol, direction, request, options, outcome
//   • error      – the four-way failure taxonomy
//   • lifecycle  – phase tracking and final-outcome bookkeeping
//   • reporter   – the injected event sink (log-backed by default)
//   • local      – local filesystem helpers shared by both clients
//   • client     – the `TransferClient` trait

pub mod types;
pub mod error;
pub mod lifecycle;
pub mod reporter;
pub mod local;
pub mod client;

pub use types::*;
pub use error::{TransferError, TransferErrorKind, TransferResult};
pub use lifecycle::{Closing, Lifecycle, TransferPhase, TransferStats};
pub use reporter::{LogReporter, MemoryReporter, TransferEvent, TransferReporter};
pub use client::TransferClient;
