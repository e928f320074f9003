//! Scriptable in-process ledger for simulation runs and tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::ledger::{IssueRequest, LedgerClient, LedgerError, TxEnvelope, TxHandle};
use crate::types::FeeQuantity;

/// Planned outcome of one broadcast.
#[derive(Debug, Clone)]
pub enum BroadcastOutcome {
    Accept,
    /// Reject with a raw provider diagnostic
    Reject(String),
}

/// Planned outcome of one confirmation wait.
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    Confirm,
    /// Report the provider's deadline diagnostic after the full wait elapses
    Timeout,
    /// Fail with a raw provider diagnostic
    Reject(String),
}

#[derive(Debug, Default)]
struct SimState {
    fee_rate: FeeQuantity,
    fee_rates: VecDeque<FeeQuantity>,
    broadcast_plan: VecDeque<BroadcastOutcome>,
    confirm_plan: VecDeque<ConfirmOutcome>,
    sequence: u64,
    next_handle: u64,
    broadcasts: Vec<TxEnvelope>,
    handles: Vec<TxHandle>,
    confirm_waits: Vec<TxHandle>,
}

/// Deterministic stand-in for a ledger node.
///
/// Outcomes are consumed front-to-back from plans; an exhausted plan falls
/// back to the happy path (steady fee rate, accepted broadcast, immediate
/// confirmation) so rehearsal runs always terminate.
pub struct SimLedger {
    inner: Mutex<SimState>,
}

impl SimLedger {
    pub fn new(fee_rate: FeeQuantity) -> Self {
        Self {
            inner: Mutex::new(SimState {
                fee_rate,
                ..SimState::default()
            }),
        }
    }

    /// Queue per-observation fee rates, used before falling back to the
    /// steady rate.
    pub fn plan_fee_rates(&self, rates: impl IntoIterator<Item = FeeQuantity>) {
        self.inner.lock().fee_rates.extend(rates);
    }

    pub fn plan_broadcasts(&self, plan: impl IntoIterator<Item = BroadcastOutcome>) {
        self.inner.lock().broadcast_plan.extend(plan);
    }

    pub fn plan_confirmations(&self, plan: impl IntoIterator<Item = ConfirmOutcome>) {
        self.inner.lock().confirm_plan.extend(plan);
    }

    /// Every envelope offered to the node, accepted or not.
    pub fn broadcasts(&self) -> Vec<TxEnvelope> {
        self.inner.lock().broadcasts.clone()
    }

    /// Handles of accepted broadcasts, in order.
    pub fn handles(&self) -> Vec<TxHandle> {
        self.inner.lock().handles.clone()
    }

    /// Handles passed to confirmation waits, in order.
    pub fn confirm_waits(&self) -> Vec<TxHandle> {
        self.inner.lock().confirm_waits.clone()
    }
}

#[async_trait]
impl LedgerClient for SimLedger {
    async fn observe_fee_rate(&self) -> Result<FeeQuantity, LedgerError> {
        let mut inner = self.inner.lock();
        let rate = inner.fee_rates.pop_front().unwrap_or(inner.fee_rate);
        Ok(rate)
    }

    async fn estimate_resource_budget(&self, _request: &IssueRequest) -> Result<u64, LedgerError> {
        Ok(84_000)
    }

    async fn next_sequence_number(&self) -> Result<u64, LedgerError> {
        Ok(self.inner.lock().sequence)
    }

    async fn broadcast(&self, envelope: &TxEnvelope) -> Result<TxHandle, LedgerError> {
        let mut inner = self.inner.lock();
        inner.broadcasts.push(envelope.clone());
        match inner
            .broadcast_plan
            .pop_front()
            .unwrap_or(BroadcastOutcome::Accept)
        {
            BroadcastOutcome::Accept => {
                inner.sequence += 1;
                let handle = TxHandle(format!("0xsim{:04x}", inner.next_handle));
                inner.next_handle += 1;
                inner.handles.push(handle.clone());
                Ok(handle)
            }
            BroadcastOutcome::Reject(diagnostic) => Err(LedgerError::Provider(diagnostic)),
        }
    }

    async fn await_confirmation(
        &self,
        handle: &TxHandle,
        _depth: u32,
        timeout: Duration,
    ) -> Result<(), LedgerError> {
        // Take the outcome before suspending; the lock must not be held
        // across the modeled wait.
        let outcome = {
            let mut inner = self.inner.lock();
            inner.confirm_waits.push(handle.clone());
            inner.confirm_plan.pop_front().unwrap_or(ConfirmOutcome::Confirm)
        };
        match outcome {
            ConfirmOutcome::Confirm => Ok(()),
            ConfirmOutcome::Timeout => {
                tokio::time::sleep(timeout).await;
                Err(LedgerError::Provider("timeout exceeded".to_string()))
            }
            ConfirmOutcome::Reject(diagnostic) => Err(LedgerError::Provider(diagnostic)),
        }
    }
}
