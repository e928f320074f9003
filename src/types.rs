//! Common types used throughout the worker

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::issuer::IssueError;

/// Operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Simulation mode (in-process simulated ledger, no real transactions)
    Simulation,
    /// Production mode (real transactions via an embedded ledger client)
    Production,
}

/// Fee quantity in the ledger's smallest denomination.
pub type FeeQuantity = u128;

/// A batch of issued records, represented on the ledger by one commitment.
///
/// Assembly of the batch (documents, proof structure, storage) happens in an
/// upstream collaborator; the issuer needs the commitment, some logging
/// context, and somewhere to record the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Hex-encoded 32-byte commitment (merkle root), `0x` prefix optional
    pub merkle_root: String,

    /// Number of records the commitment covers
    #[serde(default)]
    pub document_count: usize,

    /// When the batch was assembled
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Terminal outcome flag: `None` until a run reaches a terminal state,
    /// `Some(true)` on confirmed commit, `Some(false)` once attempts ran out
    #[serde(default)]
    pub issued: Option<bool>,
}

impl Batch {
    pub fn new(merkle_root: impl Into<String>, document_count: usize) -> Self {
        Self {
            merkle_root: merkle_root.into(),
            document_count,
            created_at: Utc::now(),
            issued: None,
        }
    }

    /// Decode the commitment into its raw 32-byte form.
    pub fn commitment(&self) -> Result<[u8; 32], IssueError> {
        let trimmed = self.merkle_root.trim_start_matches("0x");
        let bytes = hex::decode(trimmed)
            .map_err(|e| IssueError::Configuration(format!("invalid commitment hex: {e}")))?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| IssueError::Configuration(format!("commitment must be 32 bytes, got {len}")))
    }
}
