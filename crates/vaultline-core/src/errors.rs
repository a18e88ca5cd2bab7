use vaultline_core_types::{RequestId, TraceId};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Addressing
    /// No data at the requested key, version or directory
    NotFound,
    /// The key or directory does not have enough version depth for the selector
    NoHistory,
    /// Selector is incompatible with the target shape (e.g. `@3` on a directory)
    InvalidSelector,
    /// `@-N` asks for more changes than the directory has recorded
    InvalidDepth,

    // Backend
    /// Failure reported by the underlying secret store
    Store,

    // Ambient
    InvalidInput,
    Serialization,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::NoHistory => "ERR_NO_HISTORY",
            ExErrorKind::InvalidSelector => "ERR_INVALID_SELECTOR",
            ExErrorKind::InvalidDepth => "ERR_INVALID_DEPTH",
            ExErrorKind::Store => "ERR_STORE",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification plus the addressing context (path, key, version,
/// selector) needed to build an actionable message.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    key: Option<String>,
    version: Option<u64>,
    selector: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            key: None,
            version: None,
            selector: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add store path context (directory or full key path)
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add relative key context
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add version context
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    /// Add selector context (rendered suffix, e.g. `@-2`)
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the path context, if any
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Get the key context, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the version context, if any
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// Get the selector context, if any
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(version) = self.version {
            write!(f, " (version: {})", version)?;
        }
        if let Some(selector) = &self.selector {
            write!(f, " (selector: {})", selector)?;
        }
        if let Some(source) = &self.source {
            write!(f, ": caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Attach operation context to an error coming back from a store call.
///
/// Addressing failures (`NotFound`) keep their kind so callers can still
/// branch on them. Anything else is wrapped as `Store` with the original
/// error kept as the source.
pub fn annotate_store_error(
    err: ExError,
    op: &str,
    path: &str,
    version: Option<u64>,
) -> ExError {
    let wrapped = match err.kind() {
        ExErrorKind::NotFound => {
            let mut e = err.with_op(op).with_path(path);
            if e.message.is_empty() {
                e = e.with_message("no data at path");
            }
            e
        }
        _ => ExError::new(ExErrorKind::Store)
            .with_op(op)
            .with_path(path)
            .with_message("secret store call failed")
            .with_source(err),
    };
    match version {
        Some(v) => wrapped.with_version(v),
        None => wrapped,
    }
}

/// Conversion from serde_json::Error to ExError
impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
