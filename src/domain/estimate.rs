// ============================================================================
// Execution Estimate Domain Model
// ============================================================================

use arrayvec::ArrayVec;
use rust_decimal::Decimal;
use smallvec::SmallVec;
use std::fmt;

use super::{AssetId, ExecutionType, Price, Quantity, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A hypothetical order to be priced against the current book
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EstimateRequest {
    pub asset_id: AssetId,
    pub side: Side,
    pub quantity: Quantity,
    pub execution_type: ExecutionType,
    pub limit_price: Option<Price>,
}

impl EstimateRequest {
    pub fn market(asset_id: impl Into<String>, side: Side, quantity: Quantity) -> Self {
        Self {
            asset_id: AssetId::new(asset_id),
            side,
            quantity,
            execution_type: ExecutionType::Market,
            limit_price: None,
        }
    }

    pub fn limit(
        asset_id: impl Into<String>,
        side: Side,
        quantity: Quantity,
        limit_price: Price,
    ) -> Self {
        Self {
            asset_id: AssetId::new(asset_id),
            side,
            quantity,
            execution_type: ExecutionType::Limit,
            limit_price: Some(limit_price),
        }
    }
}

/// Quantity taken from one price level during a simulated fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fill {
    pub price: Price,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EstimateWarning {
    /// Matched quantity is below the requested quantity
    InsufficientLiquidity,
    /// |slippage| exceeds the configured threshold
    HighSlippage,
}

impl fmt::Display for EstimateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimateWarning::InsufficientLiquidity => f.write_str("insufficient liquidity"),
            EstimateWarning::HighSlippage => f.write_str("high slippage"),
        }
    }
}

/// Levels consumed, inline up to a typical walk depth
pub type FillBreakdown = SmallVec<[Fill; 8]>;

/// Every warning kind fits at once
pub type Warnings = ArrayVec<EstimateWarning, 2>;

/// Advisory quote for a hypothetical order. Never a binding execution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExecutionEstimate {
    pub request: EstimateRequest,
    pub matched_quantity: Quantity,
    pub unmatched_quantity: Quantity,
    /// Σ(price·qty) over the breakdown
    pub notional: Decimal,
    /// Quantity-weighted average fill price; `None` when nothing matched
    pub average_price: Option<Price>,
    /// Best opposing price at the time of the estimate
    pub best_price: Option<Price>,
    pub fee_rate: Decimal,
    pub fee_amount: Decimal,
    /// Percentage, positive when the average fill is worse than the best price
    pub slippage_pct: Decimal,
    pub breakdown: FillBreakdown,
    pub warnings: Warnings,
}

impl ExecutionEstimate {
    pub fn is_fully_matched(&self) -> bool {
        self.unmatched_quantity.is_zero()
    }

    pub fn has_warning(&self, warning: EstimateWarning) -> bool {
        self.warnings.contains(&warning)
    }

    pub fn levels_consumed(&self) -> usize {
        self.breakdown.len()
    }

    /// Least favorable price touched by the walk
    pub fn worst_price(&self) -> Option<Price> {
        self.breakdown.last().map(|fill| fill.price)
    }

    /// Total cost for a buy, or net proceeds for a sell, fee included.
    /// `None` when the sum leaves the decimal range.
    pub fn total_with_fee(&self) -> Option<Decimal> {
        match self.request.side {
            Side::Bid => self.notional.checked_add(self.fee_amount),
            Side::Ask => self.notional.checked_sub(self.fee_amount),
        }
    }
}
