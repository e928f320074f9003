//! Structured logging for engine lifecycle events

use uuid::Uuid;

use crate::issuer::IssueError;
use crate::ledger::TxHandle;
use crate::types::FeeQuantity;

/// Run-scoped logger: every event carries the run's correlation id.
#[derive(Debug, Clone)]
pub struct IssueLogger {
    run_id: String,
}

impl IssueLogger {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn log_attempt(&self, merkle_root: &str, attempt: u32, attempts: u32) {
        tracing::info!(
            run_id = %self.run_id,
            merkle_root = %merkle_root,
            attempt = %attempt,
            attempts = %attempts,
            "Issuing the batch"
        );
    }

    pub fn log_fee_computed(&self, multiplier: f64, rate: FeeQuantity, fee: FeeQuantity, final_fee: bool) {
        tracing::info!(
            run_id = %self.run_id,
            multiplier = %multiplier,
            network_rate = %rate,
            fee = %fee,
            final_fee = %final_fee,
            "Fee computed"
        );
    }

    pub fn log_broadcast(&self, fee: FeeQuantity, sequence: u64, document_count: usize) {
        tracing::info!(
            run_id = %self.run_id,
            fee = %fee,
            sequence = %sequence,
            document_count = %document_count,
            "Broadcasting issue transaction"
        );
    }

    pub fn log_duplicate_absorbed(&self, handle: &TxHandle) {
        tracing::info!(
            run_id = %self.run_id,
            pending_tx = %handle,
            "Commitment already recorded by an earlier transaction, waiting on it"
        );
    }

    pub fn log_confirmation_wait(&self, handle: &TxHandle, depth: u32, timeout_secs: u64) {
        tracing::info!(
            run_id = %self.run_id,
            pending_tx = %handle,
            confirmations = %depth,
            timeout_secs = %timeout_secs,
            "Waiting for transaction to confirm"
        );
    }

    pub fn log_escalating(&self, error: &IssueError) {
        tracing::info!(
            run_id = %self.run_id,
            error = %error,
            "Fee insufficient, escalating"
        );
    }

    pub fn log_final_attempt_failed(&self, error: &IssueError) {
        tracing::warn!(
            run_id = %self.run_id,
            error = %error,
            "Ceiling-priced transaction did not confirm, cannot escalate further"
        );
    }

    pub fn log_retry_wait(&self, error: &IssueError, interval_secs: u64) {
        tracing::warn!(
            run_id = %self.run_id,
            error = %error,
            interval_secs = %interval_secs,
            "Attempt failed, waiting before retry"
        );
    }

    pub fn log_issued(&self, merkle_root: &str, handle: Option<&TxHandle>) {
        tracing::info!(
            run_id = %self.run_id,
            merkle_root = %merkle_root,
            pending_tx = ?handle,
            "The batch issued successfully"
        );
    }

    pub fn log_exhausted(&self, merkle_root: &str, attempts: u32) {
        tracing::error!(
            run_id = %self.run_id,
            merkle_root = %merkle_root,
            attempts = %attempts,
            "Ran out of attempts, issuing failed"
        );
    }

    pub fn log_fatal(&self, merkle_root: &str, error: &IssueError) {
        tracing::error!(
            run_id = %self.run_id,
            merkle_root = %merkle_root,
            error = %error,
            category = %error.category(),
            "Issuing aborted"
        );
    }
}

impl Default for IssueLogger {
    fn default() -> Self {
        Self::new()
    }
}
