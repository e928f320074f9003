//! One-shot transaction submission.

use crate::issuer::errors::{classify, IssueError};
use crate::issuer::IssueBatch;
use crate::ledger::{LedgerClient, TxEnvelope, TxHandle};
use crate::types::{Batch, FeeQuantity};

impl<L: LedgerClient> IssueBatch<L> {
    /// Build, price, sequence and broadcast one issue transaction at `fee`.
    ///
    /// A duplicate-submission rejection means an earlier broadcast already
    /// recorded this commitment; that is success in disguise, so the
    /// existing pending handle comes back unchanged instead of an error.
    pub(crate) async fn submit(
        &mut self,
        batch: &Batch,
        fee: FeeQuantity,
    ) -> Result<TxHandle, IssueError> {
        let request = self.registry.build_issue_request(batch.commitment()?);
        let resource_budget = self
            .ledger
            .estimate_resource_budget(&request)
            .await
            .map_err(|e| classify(&e))?;
        let sequence = self
            .ledger
            .next_sequence_number()
            .await
            .map_err(|e| classify(&e))?;
        let envelope = TxEnvelope {
            request,
            fee,
            resource_budget,
            sequence,
        };

        self.log.log_broadcast(fee, sequence, batch.document_count);
        match self.ledger.broadcast(&envelope).await {
            Ok(handle) => {
                self.metrics.broadcasts_total.inc();
                self.state.pending_tx = Some(handle.clone());
                Ok(handle)
            }
            Err(raw) => match classify(&raw) {
                IssueError::DuplicateSubmission => {
                    // The earlier transaction carried the commitment; keep
                    // waiting on it rather than reporting failure.
                    self.metrics.duplicates_absorbed.inc();
                    let handle = self.state.pending_tx.clone().ok_or_else(|| {
                        IssueError::Internal(
                            "duplicate submission reported but no transaction is pending"
                                .to_string(),
                        )
                    })?;
                    self.log.log_duplicate_absorbed(&handle);
                    Ok(handle)
                }
                classified => Err(classified),
            },
        }
    }
}
