//! Core types shared across vaultline facilities
//!
//! This crate provides foundational types used by the error, logging and
//! engine layers:
//!
//! - **Correlation types**: RequestId, TraceId, RequestContext
//! - **Sensitive data**: Sensitive<T> marker for secret values
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestContext, RequestId, TraceId};
pub use sensitive::Sensitive;
