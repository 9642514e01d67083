// ============================================================================
// In-Memory Store
// Order store, trade history and asset catalog behind parking_lot locks
// ============================================================================

use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

use crate::domain::{
    AssetId, Order, OrderId, OrderStatus, OrderUpdate, OwnerId, Page, Price, Side, Trade,
    TradeFilter,
};
use crate::error::StoreError;
use crate::interfaces::{AssetCatalog, OrderQuery, OrderStore, TradeHistory};

#[derive(Debug, Default)]
struct OrderTable {
    /// Insertion order; newest last
    rows: Vec<Order>,
    by_id: HashMap<OrderId, usize>,
    /// (owner, client_order_id) -> row
    by_client_id: HashMap<(OwnerId, String), usize>,
    /// Per-asset book version
    versions: HashMap<AssetId, u64>,
}

impl OrderTable {
    fn push(&mut self, order: Order) -> Result<(), StoreError> {
        if self.by_id.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        let row = self.rows.len();
        self.by_id.insert(order.id, row);
        if let Some(key) = &order.client_order_id {
            self.by_client_id
                .insert((order.owner_id.clone(), key.clone()), row);
        }
        self.bump(&order.asset_id);
        self.rows.push(order);
        Ok(())
    }

    fn bump(&mut self, asset_id: &AssetId) {
        *self.versions.entry(asset_id.clone()).or_insert(0) += 1;
    }
}

/// In-memory implementation of every store interface.
///
/// Each call takes its lock once, so a conditional update is atomic with
/// respect to every other call. Suitable for tests, demos and embedding.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    orders: RwLock<OrderTable>,
    trades: RwLock<Vec<Trade>>,
    assets: RwLock<HashSet<AssetId>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given assets already registered
    pub fn with_assets<I, A>(assets: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let store = Self::new();
        for asset in assets {
            store.register_asset(AssetId::new(asset));
        }
        store
    }

    pub fn register_asset(&self, asset_id: AssetId) {
        self.assets.write().insert(asset_id);
    }

    /// Insert an order exactly as given, whatever its status and fill state.
    /// Used by collaborators that own fills, and by test setup.
    pub fn seed_order(&self, order: Order) -> Result<(), StoreError> {
        self.orders.write().push(order)
    }

    /// Record an executed trade
    pub fn record_trade(&self, trade: Trade) {
        self.trades.write().push(trade);
    }

    pub fn get_order(&self, order_id: OrderId) -> Option<Order> {
        let table = self.orders.read();
        table.by_id.get(&order_id).map(|&row| table.rows[row].clone())
    }

    /// Get the number of orders in the store.
    pub fn len(&self) -> usize {
        self.orders.read().rows.len()
    }

    /// Check if the store holds no orders.
    pub fn is_empty(&self) -> bool {
        self.orders.read().rows.is_empty()
    }
}

impl OrderStore for InMemoryStore {
    fn resting_orders(&self, asset_id: &AssetId, side: Side) -> Result<Vec<Order>, StoreError> {
        let table = self.orders.read();
        Ok(table
            .rows
            .iter()
            .filter(|o| {
                o.asset_id == *asset_id
                    && o.side == side
                    && OrderStatus::RESTING.contains(&o.status)
            })
            .cloned()
            .collect())
    }

    fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut table = self.orders.write();

        if let Some(key) = &order.client_order_id {
            let existing = table
                .by_client_id
                .get(&(order.owner_id.clone(), key.clone()))
                .copied();
            if let Some(row) = existing {
                return Ok(table.rows[row].clone());
            }
        }

        let stored = order.clone();
        table.push(order)?;
        Ok(stored)
    }

    fn update_where(
        &self,
        order_id: OrderId,
        owner_id: &OwnerId,
        allowed: &[OrderStatus],
        update: &OrderUpdate,
    ) -> Result<Option<Order>, StoreError> {
        let mut table = self.orders.write();

        let row = match table.by_id.get(&order_id) {
            Some(&row) => row,
            None => return Ok(None),
        };
        let order = &mut table.rows[row];

        if order.owner_id != *owner_id || !allowed.contains(&order.status) {
            return Ok(None);
        }

        order.apply(update).map_err(StoreError::Conflict)?;
        let updated = order.clone();
        table.bump(&updated.asset_id);
        Ok(Some(updated))
    }

    fn orders_by_owner(
        &self,
        owner_id: &OwnerId,
        query: &OrderQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Page<Order>, StoreError> {
        let table = self.orders.read();
        let matching: Vec<Order> = table
            .rows
            .iter()
            .rev()
            .filter(|o| o.owner_id == *owner_id && query.matches(o))
            .cloned()
            .collect();
        Ok(Page::slice(matching, offset, limit))
    }

    fn book_version(&self, asset_id: &AssetId) -> Result<u64, StoreError> {
        Ok(self.orders.read().versions.get(asset_id).copied().unwrap_or(0))
    }
}

impl TradeHistory for InMemoryStore {
    fn last_trade_price(&self, asset_id: &AssetId) -> Result<Option<Price>, StoreError> {
        let trades = self.trades.read();
        // Latest execution wins; among equal timestamps, the later record
        Ok(trades
            .iter()
            .enumerate()
            .filter(|(_, t)| t.asset_id == *asset_id)
            .max_by_key(|(seq, t)| (t.executed_at, *seq))
            .map(|(_, t)| t.price))
    }

    fn trades(
        &self,
        filter: &TradeFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Page<Trade>, StoreError> {
        let trades = self.trades.read();
        let mut matching: Vec<(usize, &Trade)> = trades
            .iter()
            .enumerate()
            .filter(|(_, t)| filter.matches(t))
            .collect();
        matching.sort_by(|(a_seq, a), (b_seq, b)| {
            b.executed_at
                .cmp(&a.executed_at)
                .then_with(|| b_seq.cmp(a_seq))
        });
        let ordered = matching.into_iter().map(|(_, t)| t.clone()).collect();
        Ok(Page::slice(ordered, offset, limit))
    }
}

impl AssetCatalog for InMemoryStore {
    fn contains(&self, asset_id: &AssetId) -> Result<bool, StoreError> {
        Ok(self.assets.read().contains(asset_id))
    }
}
