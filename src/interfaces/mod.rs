// ============================================================================
// Interfaces Module
// Contains all trait definitions and contracts
// ============================================================================

mod event_handler;
mod liquidity_source;
mod order_store;

pub use event_handler::{EventHandler, LoggingEventHandler, NoOpEventHandler, OrderEvent};
pub use liquidity_source::LiquiditySource;
pub use order_store::{AssetCatalog, OrderQuery, OrderStore, TradeHistory};
