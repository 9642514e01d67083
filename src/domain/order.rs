// ============================================================================
// Order Domain Model
// ============================================================================

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use state::{OrderStatus, OrderTransition};

/// Price of a resting order or a price level
pub type Price = Decimal;

/// Order or level quantity
pub type Quantity = Decimal;

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque identifier of a tradable instrument
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of the party owning an order, established before any engine call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    /// Buy interest
    Bid,
    /// Sell interest
    Ask,
}

impl Side {
    /// The side whose resting orders an order on this side would trade against
    pub fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }

    /// Whether an opposing level at `level_price` is at least as favorable
    /// as `limit` for an order on this side.
    pub fn accepts(self, limit: Price, level_price: Price) -> bool {
        match self {
            Side::Bid => level_price <= limit,
            Side::Ask => level_price >= limit,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }
}

impl FromStr for Side {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bid" | "buy" => Ok(Side::Bid),
            "ask" | "sell" => Ok(Side::Ask),
            other => Err(EngineError::InvalidInput(format!("Unknown side '{}'", other))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ExecutionType {
    /// Consumes liquidity at any price (taker)
    Market,
    /// Rests at a limit price (maker)
    Limit,
}

impl ExecutionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionType::Market => "market",
            ExecutionType::Limit => "limit",
        }
    }
}

impl FromStr for ExecutionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "market" => Ok(ExecutionType::Market),
            "limit" => Ok(ExecutionType::Limit),
            other => Err(EngineError::InvalidInput(format!(
                "Unknown execution type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExecutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Order State Machine
// ============================================================================

pub mod state {
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
    pub enum OrderStatus {
        Open,
        PartiallyFilled,
        Filled,
        Cancelled,
    }

    impl OrderStatus {
        /// Statuses that still contribute liquidity to the book
        pub const RESTING: [OrderStatus; 2] = [OrderStatus::Open, OrderStatus::PartiallyFilled];

        pub fn is_terminal(&self) -> bool {
            matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
        }
    }

    /// Valid state transitions for the order state machine
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OrderTransition {
        PartialFill,
        Fill,
        Cancel,
    }

    impl OrderTransition {
        /// The transition that leads into `target`, if any
        pub fn into_status(target: OrderStatus) -> Option<Self> {
            match target {
                OrderStatus::PartiallyFilled => Some(OrderTransition::PartialFill),
                OrderStatus::Filled => Some(OrderTransition::Fill),
                OrderStatus::Cancelled => Some(OrderTransition::Cancel),
                OrderStatus::Open => None,
            }
        }
    }

    impl OrderStatus {
        pub fn transition(&self, transition: OrderTransition) -> Result<OrderStatus, String> {
            match (self, transition) {
                (OrderStatus::Open, OrderTransition::PartialFill) => {
                    Ok(OrderStatus::PartiallyFilled)
                },
                (OrderStatus::Open, OrderTransition::Fill) => Ok(OrderStatus::Filled),
                (OrderStatus::Open, OrderTransition::Cancel) => Ok(OrderStatus::Cancelled),

                // Repeated partial fills keep the order partially filled
                (OrderStatus::PartiallyFilled, OrderTransition::PartialFill) => {
                    Ok(OrderStatus::PartiallyFilled)
                },
                (OrderStatus::PartiallyFilled, OrderTransition::Fill) => Ok(OrderStatus::Filled),
                (OrderStatus::PartiallyFilled, OrderTransition::Cancel) => {
                    Ok(OrderStatus::Cancelled)
                },

                _ => Err(format!(
                    "Invalid transition from {:?} via {:?}",
                    self, transition
                )),
            }
        }
    }
}

// ============================================================================
// Order Entity
// ============================================================================

/// A persisted order as held by the order store
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub owner_id: OwnerId,
    pub asset_id: AssetId,
    pub side: Side,
    pub execution_type: ExecutionType,
    /// Limit price; always `None` for market orders
    pub price: Option<Price>,
    pub quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub status: OrderStatus,
    /// Caller-supplied idempotency key
    pub client_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build the stored form of a submission: open, nothing filled yet.
    pub fn open(id: OrderId, submission: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id: submission.owner_id,
            asset_id: submission.asset_id,
            side: submission.side,
            execution_type: submission.execution_type,
            price: submission.price,
            quantity: submission.quantity,
            remaining_quantity: submission.quantity,
            status: OrderStatus::Open,
            client_order_id: submission.client_order_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this order contributes liquidity at a price level: open or
    /// partially filled, priced, with quantity left
    pub fn is_resting(&self) -> bool {
        OrderStatus::RESTING.contains(&self.status)
            && self.price.is_some()
            && self.remaining_quantity > Decimal::ZERO
    }

    pub fn filled_quantity(&self) -> Quantity {
        self.quantity - self.remaining_quantity
    }

    /// Apply an explicit partial update, enforcing the state machine.
    pub fn apply(&mut self, update: &OrderUpdate) -> Result<(), String> {
        let next_status = match update.status {
            Some(target) if target != self.status => {
                let transition = OrderTransition::into_status(target)
                    .ok_or_else(|| format!("Cannot move order back to {:?}", target))?;
                Some(self.status.transition(transition)?)
            },
            Some(_) if self.status.is_terminal() => {
                return Err(format!("Order is already {:?}", self.status));
            },
            _ => None,
        };

        if let Some(remaining) = update.remaining_quantity {
            if remaining < Decimal::ZERO || remaining > self.quantity {
                return Err(format!(
                    "Remaining quantity {} outside 0..={}",
                    remaining, self.quantity
                ));
            }
            if self.status.is_terminal() {
                return Err(format!("Order is already {:?}", self.status));
            }
        }

        if let Some(status) = next_status {
            self.status = status;
        }
        if let Some(remaining) = update.remaining_quantity {
            self.remaining_quantity = remaining;
        }
        if !update.is_empty() {
            self.updated_at = Utc::now();
        }
        Ok(())
    }

    pub fn is_market_order(&self) -> bool {
        matches!(self.execution_type, ExecutionType::Market)
    }

    pub fn is_limit_order(&self) -> bool {
        matches!(self.execution_type, ExecutionType::Limit)
    }
}

// ============================================================================
// Submission and Update Commands
// ============================================================================

/// An order as submitted by a caller, before validation and persistence
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NewOrder {
    pub owner_id: OwnerId,
    pub asset_id: AssetId,
    pub side: Side,
    pub execution_type: ExecutionType,
    pub price: Option<Price>,
    pub quantity: Quantity,
    pub client_order_id: Option<String>,
}

impl NewOrder {
    pub fn limit(
        owner_id: impl Into<String>,
        asset_id: impl Into<String>,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            owner_id: OwnerId::new(owner_id),
            asset_id: AssetId::new(asset_id),
            side,
            execution_type: ExecutionType::Limit,
            price: Some(price),
            quantity,
            client_order_id: None,
        }
    }

    pub fn market(
        owner_id: impl Into<String>,
        asset_id: impl Into<String>,
        side: Side,
        quantity: Quantity,
    ) -> Self {
        Self {
            owner_id: OwnerId::new(owner_id),
            asset_id: AssetId::new(asset_id),
            side,
            execution_type: ExecutionType::Market,
            price: None,
            quantity,
            client_order_id: None,
        }
    }

    /// Builder method: attach an idempotency key
    pub fn with_client_order_id(mut self, key: impl Into<String>) -> Self {
        self.client_order_id = Some(key.into());
        self
    }
}

/// Explicit partial update of a stored order. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderUpdate {
    pub status: Option<OrderStatus>,
    pub remaining_quantity: Option<Quantity>,
}

impl OrderUpdate {
    pub fn cancel() -> Self {
        Self {
            status: Some(OrderStatus::Cancelled),
            remaining_quantity: None,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_remaining_quantity(mut self, remaining: Quantity) -> Self {
        self.remaining_quantity = Some(remaining);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.remaining_quantity.is_none()
    }
}
