//! Fee computation and escalation.

use crate::issuer::errors::{classify, IssueError};
use crate::issuer::IssueBatch;
use crate::ledger::LedgerClient;
use crate::types::FeeQuantity;

/// Smallest-denomination units per gwei.
pub const WEI_PER_GWEI: FeeQuantity = 1_000_000_000;

/// Fee ceiling in the smallest denomination from its human-readable
/// configuration value.
pub fn ceiling_from_gwei(gwei: u64) -> FeeQuantity {
    FeeQuantity::from(gwei) * WEI_PER_GWEI
}

/// Apply a multiplier to an observed rate, rounding to the nearest unit.
///
/// Fee quantities are `u128` in the smallest unit; the fractional
/// escalation factor lives in `f64`. Realistic fees sit far below the range
/// where that conversion loses integer precision.
pub fn apply_multiplier(rate: FeeQuantity, multiplier: f64) -> FeeQuantity {
    (rate as f64 * multiplier).round() as FeeQuantity
}

impl<L: LedgerClient> IssueBatch<L> {
    /// Compute the fee for the next broadcast.
    ///
    /// Multiplies the running multiplier by the configured factor,
    /// re-observes the network rate (never reuses a stale fee), and clamps
    /// the result to the ceiling exactly. The fee never decreases across
    /// calls, even when the fresh observation comes in lower.
    pub(crate) async fn next_fee(&mut self) -> Result<FeeQuantity, IssueError> {
        let escalating = self.state.fee_multiplier.is_some();
        let multiplier = self.state.fee_multiplier.unwrap_or(1.0) * self.cfg.fee_multiplier;
        let rate = self.ledger.observe_fee_rate().await.map_err(|e| classify(&e))?;

        let mut fee = apply_multiplier(rate, multiplier);
        if let Some(current) = self.state.current_fee {
            fee = fee.max(current);
        }
        if fee >= self.state.fee_ceiling {
            fee = self.state.fee_ceiling;
        }

        self.state.fee_multiplier = Some(multiplier);
        self.state.previous_fee = self.state.current_fee;
        self.state.current_fee = Some(fee);

        if escalating {
            self.metrics.escalations_total.inc();
        }
        self.log
            .log_fee_computed(multiplier, rate, fee, fee == self.state.fee_ceiling);
        Ok(fee)
    }
}
