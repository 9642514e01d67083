// ============================================================================
// Store Module
// Reference implementations of the store interfaces
// ============================================================================

mod in_memory;

pub use in_memory::InMemoryStore;
