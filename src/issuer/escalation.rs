//! Fee-escalation decision loop.

use crate::issuer::errors::IssueError;
use crate::issuer::IssueBatch;
use crate::ledger::LedgerClient;
use crate::types::{Batch, FeeQuantity};

/// What the next pass of the loop should do.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Decision {
    /// Broadcast a fresh transaction at this fee
    Broadcast(FeeQuantity),
    /// Broadcast the final, ceiling-priced transaction
    BroadcastFinal,
    /// Nothing left to escalate; wait on the transaction already pending
    AwaitPending,
}

impl<L: LedgerClient> IssueBatch<L> {
    fn decide(&self) -> Result<Decision, IssueError> {
        let current = self.state.current_fee.ok_or_else(|| {
            IssueError::Internal("no fee computed before broadcast decision".to_string())
        })?;
        if current < self.state.fee_ceiling {
            Ok(Decision::Broadcast(current))
        } else if self.state.pending_tx.is_none() || !self.state.final_fee_offered() {
            Ok(Decision::BroadcastFinal)
        } else {
            Ok(Decision::AwaitPending)
        }
    }

    /// One Broadcasting → AwaitingConfirmation pass at the current fee.
    async fn attempt_at_current_fee(&mut self, batch: &Batch) -> Result<(), IssueError> {
        let handle = match self.decide()? {
            Decision::Broadcast(fee) => self.submit(batch, fee).await?,
            Decision::BroadcastFinal => {
                // Exactly the ceiling, never an overshoot.
                let ceiling = self.state.fee_ceiling;
                self.state.previous_fee = Some(ceiling);
                self.state.current_fee = Some(ceiling);
                self.submit(batch, ceiling).await?
            }
            Decision::AwaitPending => self.state.pending_tx.clone().ok_or_else(|| {
                IssueError::Internal("awaiting a transaction that was never broadcast".to_string())
            })?,
        };
        self.wait_for_confirmation(&handle).await
    }

    /// Drive broadcast and confirmation across fee levels until the
    /// transaction confirms or the ceiling-priced final attempt fails.
    ///
    /// A retryable failure after the final transaction propagates to the
    /// orchestrator, which may re-enter with the same state; everything
    /// else is terminal for the whole run.
    pub(crate) async fn escalate_until_confirmed(
        &mut self,
        batch: &Batch,
    ) -> Result<(), IssueError> {
        if self.state.current_fee.is_none() {
            self.next_fee().await?;
        }
        loop {
            match self.attempt_at_current_fee(batch).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_retryable() => {
                    if self.state.final_fee_offered() {
                        self.log.log_final_attempt_failed(&err);
                        return Err(err);
                    }
                    self.log.log_escalating(&err);
                    self.next_fee().await?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IssuerConfig;
    use crate::contract::RegistryBinding;
    use crate::issuer::fee::WEI_PER_GWEI;
    use crate::ledger::sim::{ConfirmOutcome, SimLedger};
    use crate::metrics::Metrics;
    use std::sync::Arc;

    const ROOT: &str = "af81cf07a164a5e144e2c37bbd71e6e0db38e20ec0a7297b218dce5672d4589f";

    fn engine(ledger: Arc<SimLedger>, ceiling_gwei: u64) -> IssueBatch<SimLedger> {
        let cfg = IssuerConfig {
            fee_multiplier: 1.2,
            fee_ceiling_gwei: ceiling_gwei,
            confirmation_threshold: 12,
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
    async fn test_final_broadcast_is_priced_exactly_at_ceiling() {
        // 40 gwei rate escalates past the 50 gwei ceiling on the second
        // computation (40 * 1.44 = 57.6 gwei); the follow-up broadcast must
        // offer 50 gwei exactly.
        let ledger = Arc::new(SimLedger::new(40 * WEI_PER_GWEI));
        ledger.plan_confirmations([ConfirmOutcome::Timeout, ConfirmOutcome::Confirm]);
        let mut engine = engine(ledger.clone(), 50);
        let batch = Batch::new(ROOT, 2);

        engine.escalate_until_confirmed(&batch).await.unwrap();
        let fees: Vec<_> = ledger.broadcasts().iter().map(|b| b.fee).collect();
        assert_eq!(fees, vec![48 * WEI_PER_GWEI, 50 * WEI_PER_GWEI]);
        assert!(engine.state().final_fee_offered());
    }

    #[tokio::test(start_paused = true)]
    async fn test_resumed_run_waits_on_pending_final_transaction() {
        // First entry broadcasts the final transaction and times out.
        let ledger = Arc::new(SimLedger::new(60 * WEI_PER_GWEI));
        ledger.plan_confirmations([ConfirmOutcome::Timeout]);
        let mut engine = engine(ledger.clone(), 50);
        let batch = Batch::new(ROOT, 2);

        let err = engine.escalate_until_confirmed(&batch).await.unwrap_err();
        assert!(matches!(err, IssueError::Timeout));
        assert_eq!(ledger.broadcasts().len(), 1);

        // Re-entry must not broadcast again; it waits on the same handle.
        engine.escalate_until_confirmed(&batch).await.unwrap();
        assert_eq!(ledger.broadcasts().len(), 1);
        assert_eq!(ledger.confirm_waits().len(), 2);
        assert_eq!(ledger.confirm_waits()[0], ledger.confirm_waits()[1]);
    }

    #[tokio::test]
    async fn test_unclassified_confirmation_failure_is_terminal() {
        let ledger = Arc::new(SimLedger::new(10 * WEI_PER_GWEI));
        ledger.plan_confirmations([ConfirmOutcome::Reject("node out of sync".to_string())]);
        let mut engine = engine(ledger.clone(), 200);
        let batch = Batch::new(ROOT, 2);

        let err = engine.escalate_until_confirmed(&batch).await.unwrap_err();
        assert!(matches!(err, IssueError::Unclassified(_)));
        assert_eq!(ledger.broadcasts().len(), 1);
    }
}
