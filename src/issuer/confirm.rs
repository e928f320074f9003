//! Confirmation waiting.

use std::time::{Duration, Instant};

use crate::issuer::errors::{classify, IssueError};
use crate::issuer::IssueBatch;
use crate::ledger::{LedgerClient, TxHandle};

impl<L: LedgerClient> IssueBatch<L> {
    /// Wait until `handle` reaches the configured confirmation depth.
    ///
    /// A deadline here only means confirmation was not observed in time; the
    /// transaction may still land later, which is why a subsequent
    /// duplicate rejection is absorbed as success.
    pub(crate) async fn wait_for_confirmation(&self, handle: &TxHandle) -> Result<(), IssueError> {
        self.log.log_confirmation_wait(
            handle,
            self.cfg.confirmation_threshold,
            self.cfg.transaction_timeout_secs,
        );
        let started = Instant::now();
        let result = self
            .ledger
            .await_confirmation(
                handle,
                self.cfg.confirmation_threshold,
                Duration::from_secs(self.cfg.transaction_timeout_secs),
            )
            .await;
        self.metrics
            .confirmation_wait
            .observe(started.elapsed().as_secs_f64());
        result.map_err(|e| classify(&e))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::IssuerConfig;
    use crate::contract::RegistryBinding;
    use crate::issuer::{IssueBatch, IssueError};
    use crate::ledger::sim::{ConfirmOutcome, SimLedger};
    use crate::ledger::TxHandle;
    use crate::metrics::Metrics;
    use std::sync::Arc;

    fn engine(ledger: Arc<SimLedger>) -> IssueBatch<SimLedger> {
        let cfg = IssuerConfig {
            fee_multiplier: 1.2,
            fee_ceiling_gwei: 200,
            confirmation_threshold: 3,
            transaction_timeout_secs: 180,
            attempts: 10,
            attempt_interval_secs: 60,
        };
        IssueBatch::new(
            ledger,
            RegistryBinding::new("0xregistry"),
            cfg,
            Arc::new(Metrics::new().unwrap()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_surfaces_as_classified_timeout() {
        let ledger = Arc::new(SimLedger::new(10));
        ledger.plan_confirmations([ConfirmOutcome::Timeout]);
        let engine = engine(ledger);

        let err = engine
            .wait_for_confirmation(&TxHandle("0xabc".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, IssueError::Timeout));
    }

    #[tokio::test]
    async fn test_other_failures_stay_unclassified() {
        let ledger = Arc::new(SimLedger::new(10));
        ledger.plan_confirmations([ConfirmOutcome::Reject("node out of sync".to_string())]);
        let engine = engine(ledger);

        let err = engine
            .wait_for_confirmation(&TxHandle("0xabc".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, IssueError::Unclassified(_)));
    }
}
