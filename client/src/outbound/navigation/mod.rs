//! Navigation adapters for the view-state router.

mod memory_history;

pub use memory_history::MemoryHistory;
