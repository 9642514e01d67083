// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod config;
pub mod estimate;
pub mod order;
pub mod order_book;
pub mod pagination;
pub mod trade;

pub use config::{EngineConfig, FeeSchedule};
pub use estimate::{EstimateRequest, EstimateWarning, ExecutionEstimate, Fill};
pub use order::{
    AssetId, ExecutionType, NewOrder, Order, OrderId, OrderUpdate, OwnerId, Price, Quantity, Side,
};
pub use order_book::{BookLevels, OrderBookSnapshot, PriceLevel};
pub use pagination::{Page, PageRequest};
pub use trade::{Trade, TradeFilter};

// Re-export state machine
pub use order::state::{OrderStatus, OrderTransition};
