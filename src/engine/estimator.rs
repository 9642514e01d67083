// ============================================================================
// Execution Estimator
// Simulates a hypothetical fill against aggregated opposing liquidity
// ============================================================================

use crate::domain::estimate::{FillBreakdown, Warnings};
use crate::domain::{
    EstimateRequest, EstimateWarning, ExecutionEstimate, ExecutionType, Fill, Price, PriceLevel,
    Side,
};
use crate::engine::FeePolicy;
use crate::error::{EngineError, EngineResult};
use rust_decimal::Decimal;

/// Read-only fill simulator.
///
/// Walks opposing levels in matching priority, taking `min(level, still
/// needed)` at each. Market orders walk until filled or out of levels; limit
/// orders also stop at the first level worse than their limit.
///
/// # Example
/// ```text
/// Asks:  2.46 x 300, 2.47 x 200, 2.48 x 100
///
/// Limit buy 500 @ 2.47
/// Result: 300 @ 2.46 + 200 @ 2.47, average 2.464, 2.48 never touched
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionEstimator {
    fees: FeePolicy,
    high_slippage_threshold_pct: Decimal,
}

impl ExecutionEstimator {
    pub fn new(fees: FeePolicy, high_slippage_threshold_pct: Decimal) -> Self {
        Self {
            fees,
            high_slippage_threshold_pct,
        }
    }

    /// Check the request and normalize it: a zero price on a market order is
    /// treated as absent.
    pub fn validate(&self, request: &EstimateRequest) -> EngineResult<EstimateRequest> {
        if request.quantity <= Decimal::ZERO {
            return Err(EngineError::InvalidInput(
                "Quantity must be positive".to_string(),
            ));
        }

        let mut normalized = request.clone();
        match (request.execution_type, request.limit_price) {
            (ExecutionType::Limit, Some(price)) if price > Decimal::ZERO => {},
            (ExecutionType::Limit, _) => {
                return Err(EngineError::InvalidInput(
                    "Limit orders need a positive limit price".to_string(),
                ));
            },
            (ExecutionType::Market, Some(price)) if !price.is_zero() => {
                return Err(EngineError::InvalidInput(
                    "Market orders cannot carry a limit price".to_string(),
                ));
            },
            (ExecutionType::Market, _) => normalized.limit_price = None,
        }
        Ok(normalized)
    }

    /// Price `request` against `opposing`, which must be in matching priority
    /// (lowest ask first for a buy, highest bid first for a sell).
    ///
    /// Zero liquidity yields a zero-match estimate with a warning. The only
    /// failure is a walk whose totals exceed the decimal range.
    pub fn estimate(
        &self,
        request: EstimateRequest,
        opposing: &[PriceLevel],
    ) -> EngineResult<ExecutionEstimate> {
        let mut breakdown = FillBreakdown::new();
        let mut matched_quantity = Decimal::ZERO;
        let mut notional = Decimal::ZERO;

        for level in opposing {
            let needed = request.quantity - matched_quantity;
            if needed <= Decimal::ZERO {
                break;
            }
            if let Some(limit) = request.limit_price {
                if !request.side.accepts(limit, level.price) {
                    break;
                }
            }

            let take = level.quantity.min(needed);
            if take <= Decimal::ZERO {
                continue;
            }
            notional = level
                .price
                .checked_mul(take)
                .and_then(|cost| notional.checked_add(cost))
                .ok_or_else(|| overflow("notional"))?;
            matched_quantity = matched_quantity
                .checked_add(take)
                .ok_or_else(|| overflow("matched quantity"))?;
            breakdown.push(Fill {
                price: level.price,
                quantity: take,
            });
        }

        let average_price = if matched_quantity.is_zero() {
            None
        } else {
            Some(
                notional
                    .checked_div(matched_quantity)
                    .ok_or_else(|| overflow("average price"))?,
            )
        };
        let best_price = opposing.first().map(|level| level.price);
        let slippage_pct = slippage_pct(request.side, average_price, best_price)
            .ok_or_else(|| overflow("slippage"))?;
        let fee_amount = self
            .fees
            .fee_for(request.execution_type, notional)
            .ok_or_else(|| overflow("fee"))?;

        let mut warnings = Warnings::new();
        if matched_quantity < request.quantity {
            warnings.push(EstimateWarning::InsufficientLiquidity);
        }
        if slippage_pct.abs() > self.high_slippage_threshold_pct {
            warnings.push(EstimateWarning::HighSlippage);
        }

        Ok(ExecutionEstimate {
            unmatched_quantity: request.quantity - matched_quantity,
            fee_rate: self.fees.rate_for(request.execution_type),
            fee_amount,
            request,
            matched_quantity,
            notional,
            average_price,
            best_price,
            slippage_pct,
            breakdown,
            warnings,
        })
    }
}

fn overflow(what: &str) -> EngineError {
    EngineError::InvalidInput(format!("Estimated {} overflows the decimal range", what))
}

/// Percentage move of the average fill away from the best opposing price,
/// positive when it is worse for the requester. `None` on overflow.
fn slippage_pct(
    side: Side,
    average_price: Option<Price>,
    best_price: Option<Price>,
) -> Option<Decimal> {
    match (average_price, best_price) {
        (Some(average), Some(best)) if best > Decimal::ZERO => {
            let adverse_move = match side {
                Side::Bid => average.checked_sub(best)?,
                Side::Ask => best.checked_sub(average)?,
            };
            adverse_move
                .checked_div(best)?
                .checked_mul(Decimal::ONE_HUNDRED)
        },
        _ => Some(Decimal::ZERO),
    }
}
