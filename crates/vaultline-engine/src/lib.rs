//! Vaultline Engine - Orchestration layer
//!
//! Drives the pure logic of `vaultline-core` against a live `SecretStore`:
//! versioned reads, timelines, point-in-time reconstruction, snapshot
//! capture and reconciliation, history and duplicate scans.
//!
//! Callers either use the functions under [`commands`] directly or go
//! through the `apply_engine_query` / `apply_engine_command` dispatchers.

pub mod commands;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use commands::engine_query::{apply_engine_query, EngineQuery, EngineQueryResult};
