//! Structured operation logging.
//!
//! Every engine operation logs a `start` event, then either `end` with its
//! duration or `end_error` with the error kind and code. Field names come
//! from `core_types::schema`. Secret values never appear in fields; paths,
//! versions and counts do.
//!
//! ```rust
//! use vaultline_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Tests install `test_capture` instead of `init` and assert on the
//! recorded fields.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, init_from_settings, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
