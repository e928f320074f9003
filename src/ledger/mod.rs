//! Ledger capability boundary.
//!
//! The engine never talks to a node library directly; everything it needs
//! from the ledger sits behind [`LedgerClient`]. Errors cross this boundary
//! as raw provider diagnostics; classification happens in exactly one place
//! (`issuer::classify`), so no other code inspects error text.

pub mod sim;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::FeeQuantity;

/// Raw error surfaced by a ledger node or its client library.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Diagnostic produced by the node: revert reasons, mempool rejections,
    /// deadline reports
    #[error("provider error: {0}")]
    Provider(String),

    /// Connection-level failure before the node produced a diagnostic
    #[error("transport error: {0}")]
    Transport(String),
}

/// Opaque identifier of a broadcast transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxHandle(pub String);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unsigned request to invoke the registry's issue operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    /// Registry contract address
    pub contract: String,

    /// Commitment the call records
    pub commitment: [u8; 32],
}

/// Fully priced and sequenced transaction, ready to sign and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxEnvelope {
    pub request: IssueRequest,

    /// Offered price per unit of computation, smallest denomination
    pub fee: FeeQuantity,

    /// Resource budget the node estimated for the call
    pub resource_budget: u64,

    /// Account sequence number assigned to the transaction
    pub sequence: u64,
}

/// Capabilities the engine consumes from a ledger node.
///
/// One envelope in flight at a time per engine instance; implementations do
/// not need to support concurrent calls from the same run.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Currently observed network fee rate (price per unit of computation).
    async fn observe_fee_rate(&self) -> Result<FeeQuantity, LedgerError>;

    /// Estimate the resource budget the request will consume.
    async fn estimate_resource_budget(&self, request: &IssueRequest) -> Result<u64, LedgerError>;

    /// Next sequence number for the submitting account.
    async fn next_sequence_number(&self) -> Result<u64, LedgerError>;

    /// Sign and broadcast the envelope.
    async fn broadcast(&self, envelope: &TxEnvelope) -> Result<TxHandle, LedgerError>;

    /// Block until `handle` has accumulated `depth` confirmations, failing
    /// with the provider's deadline diagnostic once `timeout` elapses.
    async fn await_confirmation(
        &self,
        handle: &TxHandle,
        depth: u32,
        timeout: Duration,
    ) -> Result<(), LedgerError>;
}
