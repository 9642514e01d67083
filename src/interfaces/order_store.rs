// ============================================================================
// Store Interfaces
// Contracts for the external collaborators that own persisted state
// ============================================================================

use crate::domain::{
    AssetId, Order, OrderId, OrderStatus, OrderUpdate, OwnerId, Page, Price, Side, Trade,
    TradeFilter,
};
use crate::error::StoreError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Filter for an owner's order listing. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderQuery {
    pub asset_id: Option<AssetId>,
    pub status: Option<OrderStatus>,
}

impl OrderQuery {
    pub fn for_asset(asset_id: AssetId) -> Self {
        Self {
            asset_id: Some(asset_id),
            status: None,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.asset_id
            .as_ref()
            .map_or(true, |asset| *asset == order.asset_id)
            && self.status.map_or(true, |status| status == order.status)
    }
}

/// Durable record of every order. The single source of truth for liquidity.
pub trait OrderStore: Send + Sync {
    /// Raw rows for one asset and side whose status is open or partially filled
    fn resting_orders(&self, asset_id: &AssetId, side: Side) -> Result<Vec<Order>, StoreError>;

    /// Persist a new order. When the owner already stored an order under the
    /// same `client_order_id`, that order is returned instead of a duplicate.
    fn insert(&self, order: Order) -> Result<Order, StoreError>;

    /// Apply `update` to the single row matching both ids whose status is in
    /// `allowed`, as one atomic step. `None` when no row qualified.
    fn update_where(
        &self,
        order_id: OrderId,
        owner_id: &OwnerId,
        allowed: &[OrderStatus],
        update: &OrderUpdate,
    ) -> Result<Option<Order>, StoreError>;

    /// Newest-first listing of an owner's orders
    fn orders_by_owner(
        &self,
        owner_id: &OwnerId,
        query: &OrderQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Page<Order>, StoreError>;

    /// Monotonic counter for one asset's book, advanced by every committed
    /// insert or update of that asset's orders, whoever made it. Cached
    /// levels are valid only while this value is unchanged.
    fn book_version(&self, asset_id: &AssetId) -> Result<u64, StoreError>;
}

/// Executed trades, written by the matching collaborator
pub trait TradeHistory: Send + Sync {
    fn last_trade_price(&self, asset_id: &AssetId) -> Result<Option<Price>, StoreError>;

    /// Newest-first listing of trades matching `filter`
    fn trades(
        &self,
        filter: &TradeFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Page<Trade>, StoreError>;
}

/// Registry of tradable assets
pub trait AssetCatalog: Send + Sync {
    fn contains(&self, asset_id: &AssetId) -> Result<bool, StoreError>;
}
