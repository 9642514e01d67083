// ============================================================================
// Fee Policy
// Maker/taker rate lookup by execution type
// ============================================================================

use crate::domain::{ExecutionType, FeeSchedule};
use rust_decimal::Decimal;

/// Stateless mapping from execution type to fee rate.
///
/// Market orders take liquidity and pay the taker rate; limit orders pay the
/// maker rate whether or not they would fill immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeePolicy {
    schedule: FeeSchedule,
}

impl FeePolicy {
    pub fn new(schedule: FeeSchedule) -> Self {
        Self { schedule }
    }

    pub fn rate_for(&self, execution_type: ExecutionType) -> Decimal {
        match execution_type {
            ExecutionType::Market => self.schedule.taker_rate,
            ExecutionType::Limit => self.schedule.maker_rate,
        }
    }

    /// Fee charged on `notional`, `None` if the product overflows
    pub fn fee_for(&self, execution_type: ExecutionType, notional: Decimal) -> Option<Decimal> {
        notional.checked_mul(self.rate_for(execution_type))
    }

    pub fn schedule(&self) -> FeeSchedule {
        self.schedule
    }
}
