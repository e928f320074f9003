//! Batch commitment issuer
//!
//! Reliably commits a batch commitment (the merkle root of a set of issued
//! records) to a ledger's commitment registry under fee-market volatility,
//! slow propagation and transient node failures. The heart of the crate is
//! the fee-escalation and retry engine in [`issuer`]; the ledger itself is a
//! capability behind [`ledger::LedgerClient`], so the engine never depends
//! on a particular node library.

pub mod config;
pub mod contract;
pub mod issuer;
pub mod ledger;
pub mod metrics;
pub mod structured_logging;
pub mod types;

// Re-export commonly used types
pub use issuer::{IssueBatch, IssueError};
pub use types::Batch;
