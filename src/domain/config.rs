// ============================================================================
// Engine Configuration
// Depth limits, fee schedule, warning thresholds and paging
// ============================================================================

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Taker rate applied to market orders (0.2%)
pub const DEFAULT_TAKER_FEE_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 3);

/// Maker rate applied to limit orders (0.1%)
pub const DEFAULT_MAKER_FEE_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Slippage percentage above which an estimate is flagged
pub const DEFAULT_HIGH_SLIPPAGE_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

pub const DEFAULT_MAX_DEPTH: usize = 50;
pub const DEFAULT_DEPTH: usize = 10;
pub const DEFAULT_MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 20;

// ============================================================================
// Fee Schedule
// ============================================================================

/// Process-wide maker/taker rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeeSchedule {
    pub taker_rate: Decimal,
    pub maker_rate: Decimal,
}

impl FeeSchedule {
    pub fn new(taker_rate: Decimal, maker_rate: Decimal) -> Self {
        Self {
            taker_rate,
            maker_rate,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.maker_rate < Decimal::ZERO {
            return Err(EngineError::InvalidConfig(
                "Maker rate cannot be negative".to_string(),
            ));
        }
        if self.taker_rate >= Decimal::ONE {
            return Err(EngineError::InvalidConfig(
                "Taker rate must be below 1".to_string(),
            ));
        }
        // Posting liquidity must stay cheaper than taking it, unless both are free
        if self.taker_rate <= self.maker_rate && !self.is_zero() {
            return Err(EngineError::InvalidConfig(
                "Taker rate must exceed maker rate".to_string(),
            ));
        }
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.taker_rate.is_zero() && self.maker_rate.is_zero()
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_TAKER_FEE_RATE, DEFAULT_MAKER_FEE_RATE)
    }
}

// ============================================================================
// Complete Engine Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Largest snapshot depth a caller may request; larger requests are rejected
    pub max_depth: usize,

    /// Depth used when a caller does not choose one
    pub default_depth: usize,

    pub fees: FeeSchedule,

    /// Estimates whose |slippage| exceeds this percentage carry a warning
    pub high_slippage_threshold_pct: Decimal,

    /// Read-through caching of aggregated levels per asset
    pub cache_enabled: bool,

    pub max_page_size: usize,
    pub default_page_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_depth: DEFAULT_DEPTH,
            fees: FeeSchedule::default(),
            high_slippage_threshold_pct: DEFAULT_HIGH_SLIPPAGE_PCT,
            cache_enabled: true,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EngineConfig {
    /// Builder method: Set maximum snapshot depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Builder method: Set default snapshot depth
    pub fn with_default_depth(mut self, depth: usize) -> Self {
        self.default_depth = depth;
        self
    }

    /// Builder method: Set fee schedule
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Builder method: Set high-slippage warning threshold (percent)
    pub fn with_high_slippage_threshold(mut self, pct: Decimal) -> Self {
        self.high_slippage_threshold_pct = pct;
        self
    }

    /// Builder method: Enable or disable the snapshot cache
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Builder method: Set paging limits
    pub fn with_page_sizes(mut self, default_size: usize, max_size: usize) -> Self {
        self.default_page_size = default_size;
        self.max_page_size = max_size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> EngineResult<()> {
        if self.max_depth == 0 {
            return Err(EngineError::InvalidConfig(
                "Max depth must be positive".to_string(),
            ));
        }

        if self.default_depth == 0 || self.default_depth > self.max_depth {
            return Err(EngineError::InvalidConfig(
                "Default depth must be within 1..=max_depth".to_string(),
            ));
        }

        if self.high_slippage_threshold_pct <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig(
                "Slippage threshold must be positive".to_string(),
            ));
        }

        if self.max_page_size == 0
            || self.default_page_size == 0
            || self.default_page_size > self.max_page_size
        {
            return Err(EngineError::InvalidConfig(
                "Default page size must be within 1..=max_page_size".to_string(),
            ));
        }

        self.fees.validate()
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl EngineConfig {
    /// Every read goes straight to the store
    pub fn uncached() -> Self {
        Self::default().with_cache(false)
    }

    /// No fees charged; useful for demos and reconciliation checks
    pub fn zero_fee() -> Self {
        Self::default().with_fees(FeeSchedule::new(Decimal::ZERO, Decimal::ZERO))
    }
}
