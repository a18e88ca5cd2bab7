//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across every crate that logs.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Secret store addressing
pub const FIELD_PATH: &str = "path";
pub const FIELD_KEY: &str = "key";
pub const FIELD_VERSION: &str = "version";
pub const FIELD_SELECTOR: &str = "selector";

// Collection sizes
pub const FIELD_KEY_COUNT: &str = "key_count";
pub const FIELD_EVENT_COUNT: &str = "event_count";
pub const FIELD_FAILED_COUNT: &str = "failed_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
