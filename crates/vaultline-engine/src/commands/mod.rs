//! Command orchestration layer.
//!
//! Each module pairs one group of operations with the store calls it
//! needs. Read-only operations take `&dyn SecretStore`; reconciliation is
//! the only operation that takes `&mut`.

pub mod duplicates;
pub mod engine_command;
pub mod engine_query;
pub mod history;
pub mod reconstruct;
pub mod resolve;
pub mod snapshot;
pub mod state;
pub mod timeline;
