//! Sync state carried between runs
//!
//! Incremental streams leave a watermark behind after each sync.
//! [`State`] maps stream names to those saved cursor objects, and
//! [`StateManager`] loads them at startup and persists updates
//! atomically while a sync is running.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::State;
