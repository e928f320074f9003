//! Batch issuing engine.
//!
//! Drives one batch commitment onto the ledger through a fee-escalation
//! state machine wrapped in a bounded retry loop. The module is split by
//! concern:
//!
//! - **errors**: the closed error taxonomy and the single classification seam
//! - **state**: bookkeeping owned by exactly one run
//! - **fee**: next-fee computation against the live network rate
//! - **submit**: one-shot broadcast with duplicate absorption
//! - **confirm**: depth-based confirmation waiting
//! - **escalation**: the decision loop across fee levels
//!
//! The engine is strictly sequential: one ledger call in flight at a time,
//! at most one pending transaction, and exactly one terminal write to the
//! batch's outcome flag per run.

mod confirm;
mod errors;
mod escalation;
mod fee;
mod state;
mod submit;

pub use errors::{classify, IssueError};
pub use fee::{apply_multiplier, ceiling_from_gwei, WEI_PER_GWEI};
pub use state::SubmissionState;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::config::IssuerConfig;
use crate::contract::RegistryBinding;
use crate::ledger::LedgerClient;
use crate::metrics::Metrics;
use crate::structured_logging::IssueLogger;
use crate::types::Batch;

/// One batch-submission run.
///
/// Construct per batch; [`IssueBatch::run`] drives the batch to a terminal
/// outcome. Retries resume the run's [`SubmissionState`] rather than
/// restarting it, so escalation progress and the pending transaction
/// survive across attempts.
pub struct IssueBatch<L: LedgerClient> {
    ledger: Arc<L>,
    registry: RegistryBinding,
    cfg: IssuerConfig,
    metrics: Arc<Metrics>,
    log: IssueLogger,
    state: SubmissionState,
}

impl<L: LedgerClient> IssueBatch<L> {
    pub fn new(
        ledger: Arc<L>,
        registry: RegistryBinding,
        cfg: IssuerConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        let state = SubmissionState::new(ceiling_from_gwei(cfg.fee_ceiling_gwei));
        Self {
            ledger,
            registry,
            cfg,
            metrics,
            log: IssueLogger::new(),
            state,
        }
    }

    /// Run bookkeeping, exposed for inspection.
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Issue the batch commitment, escalating and retrying until a terminal
    /// outcome, then record that outcome on the batch.
    ///
    /// `batch.issued` becomes `Some(true)` on confirmed commit and
    /// `Some(false)` once attempts are exhausted. An unclassified error
    /// aborts immediately without consuming an attempt and leaves the flag
    /// unset; the caller must treat that as "unknown, reconcile manually".
    pub async fn run(&mut self, batch: &mut Batch) -> Result<(), IssueError> {
        loop {
            self.log
                .log_attempt(&batch.merkle_root, self.state.attempt + 1, self.cfg.attempts);
            match self.escalate_until_confirmed(batch).await {
                Ok(()) => {
                    batch.issued = Some(true);
                    self.metrics.batches_issued.inc();
                    self.log
                        .log_issued(&batch.merkle_root, self.state.pending_tx.as_ref());
                    return Ok(());
                }
                Err(err) if err.is_retryable() => {
                    self.state.attempt += 1;
                    self.metrics.retries_total.inc();
                    if self.state.attempt < self.cfg.attempts {
                        self.log.log_retry_wait(&err, self.cfg.attempt_interval_secs);
                        sleep(Duration::from_secs(self.cfg.attempt_interval_secs)).await;
                    } else {
                        batch.issued = Some(false);
                        self.metrics.batches_failed.inc();
                        self.log.log_exhausted(&batch.merkle_root, self.state.attempt);
                        return Err(IssueError::RetryExhausted {
                            attempts: self.state.attempt,
                            source: Box::new(err),
                        });
                    }
                }
                Err(err) => {
                    self.log.log_fatal(&batch.merkle_root, &err);
                    return Err(err);
                }
            }
        }
    }
}
