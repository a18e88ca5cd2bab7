//! Canonical logging macros
//!
//! Every engine operation is bracketed by exactly one start event and one
//! end (or end_error) event.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use vaultline_core::log_op_start;
/// log_op_start!("build_timeline");
/// log_op_start!("build_timeline", path = "secret/app");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use vaultline_core::log_op_end;
/// log_op_end!("build_timeline", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation failure.
///
/// Records the error's kind and code plus whichever of path, key and
/// version the error carries, so a failed read can be traced to the exact
/// secret version without logging its value.
///
/// # Example
///
/// ```
/// # use vaultline_core::log_op_error;
/// use vaultline_core::errors::{ExError, ExErrorKind};
///
/// let err = ExError::new(ExErrorKind::NotFound).with_path("secret/app");
/// log_op_error!("read_versioned", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {
        $crate::log_op_error!($op, $err, duration_ms = $duration,)
    };
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: &$crate::errors::ExError = &$err;
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.path = ex_err.path(),
            err.key = ex_err.key(),
            err.version = ex_err.version(),
            $($field)*
        );
    }};
}
