//! In-memory versioned backend.
//!
//! Mirrors the semantics of a KV-v2 secrets engine: every write creates a
//! new version, old versions stay readable until pruned, deleted or
//! destroyed, and key metadata tracks the current version.

pub mod clock;
pub mod store;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use store::{KvConfig, MemoryStore};
