//! Correlation ids for engine invocations
//!
//! A `RequestContext` is handed to every engine query and command. Its
//! request id tags the dispatch span and any error returned, so log lines
//! and failures from one diff or restore can be tied together. The trace
//! id is only set when an outer caller supplies one.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! correlation_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Fresh time-ordered (UUIDv7) id
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Wrap an id issued elsewhere
            pub fn from_string(s: String) -> Self {
                Self(s)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

correlation_id!(
    /// Identifies one engine query or command
    RequestId
);

correlation_id!(
    /// Identifier propagated from an outer caller
    TraceId
);

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub trace_id: Option<TraceId>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            trace_id: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}
