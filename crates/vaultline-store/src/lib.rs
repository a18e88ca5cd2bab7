//! Vaultline Store - versioned key-value backends for the engine
//!
//! Provides:
//! - `MemoryStore`, an in-memory KV-v2 style backend with per-key version
//!   history, soft delete, destroy and oldest-first pruning
//! - Injectable clocks for deterministic timestamps in tests
//! - `KvError`, the backend error taxonomy, convertible into `ExError`

pub mod errors;
pub mod memory;

// Re-export key types
pub use errors::{KvError, Result};
pub use memory::{Clock, KvConfig, MemoryStore, SteppingClock, SystemClock};
