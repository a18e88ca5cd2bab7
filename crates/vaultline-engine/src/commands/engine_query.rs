//! Engine-level read-only query surface.
//!
//! `apply_engine_query` is the single entry point for every read-only
//! operation. Unlike `apply_engine_command`, it takes a shared store
//! reference and never writes.

#![allow(clippy::result_large_err)]

use tracing::info_span;
use vaultline_core::diff::{render_human_summary, DiffLabels, SummaryOptions};
use vaultline_core::errors::{ExError, Result};
use vaultline_core::store::SecretStore;
use vaultline_core::timeline::Timeline;
use vaultline_core_types::RequestContext;

use crate::commands::duplicates::{find_duplicates, DuplicateReport};
use crate::commands::history::{directory_history, key_history, DirectoryHistory, KeyHistory};
use crate::commands::resolve::{
    detect_shape, diff_versioned, read_versioned, ResolvedState, SourceShape, VersionedDiff,
};
use crate::commands::timeline::build_timeline;

// ---------------------------------------------------------------------------
// EngineQuery
// ---------------------------------------------------------------------------

/// Read-only queries supported by the engine.
#[derive(Debug, Clone)]
pub enum EngineQuery {
    /// Merged newest-first write stream of a directory.
    Timeline { path: String },
    /// Flat state named by `path[@selector]`.
    ReadVersioned { reference: String },
    /// Diff of two versioned references, with a rendered summary.
    Diff {
        first: String,
        second: String,
        summary: SummaryOptions,
    },
    /// History of a key or a directory, whichever `path` is. `limit` 0
    /// lists everything.
    History { path: String, limit: usize },
    /// Fields sharing a value under a directory.
    Duplicates { path: String },
}

/// The structured + rendered result of a `Diff` query.
#[derive(Debug, Clone)]
pub struct DiffQueryResult {
    pub structured_diff: VersionedDiff,
    pub human_summary: String,
}

/// Result of a history query, shaped by what the path turned out to be.
#[derive(Debug, Clone)]
pub enum HistoryResult {
    Key(KeyHistory),
    Directory(DirectoryHistory),
}

/// Result of applying an engine query.
#[derive(Debug, Clone)]
pub enum EngineQueryResult {
    Timeline(Timeline),
    ReadVersioned(ResolvedState),
    Diff(DiffQueryResult),
    History(HistoryResult),
    Duplicates(DuplicateReport),
}

/// Apply a read-only query inside a span tagged with the request id.
///
/// Errors come back tagged with the request (and trace) id of `ctx`.
pub fn apply_engine_query(
    query: EngineQuery,
    store: &dyn SecretStore,
    ctx: &RequestContext,
) -> Result<EngineQueryResult> {
    let span = info_span!("engine_query", request_id = %ctx.request_id);
    let _guard = span.enter();

    dispatch_query(query, store).map_err(|e| tag_error(e, ctx))
}

fn dispatch_query(query: EngineQuery, store: &dyn SecretStore) -> Result<EngineQueryResult> {
    match query {
        EngineQuery::Timeline { path } => {
            build_timeline(store, &path).map(EngineQueryResult::Timeline)
        }
        EngineQuery::ReadVersioned { reference } => {
            read_versioned(store, &reference).map(EngineQueryResult::ReadVersioned)
        }
        EngineQuery::Diff {
            first,
            second,
            summary,
        } => {
            let structured_diff = diff_versioned(store, &first, &second)?;
            let labels = DiffLabels::new(
                structured_diff.first.to_string(),
                structured_diff.second.to_string(),
            );
            let human_summary = render_human_summary(&structured_diff.diff, &labels, &summary);
            Ok(EngineQueryResult::Diff(DiffQueryResult {
                structured_diff,
                human_summary,
            }))
        }
        EngineQuery::History { path, limit } => {
            let history = match detect_shape(store, &path)? {
                SourceShape::Directory => {
                    HistoryResult::Directory(directory_history(store, &path, limit)?)
                }
                SourceShape::Key => HistoryResult::Key(key_history(store, &path, limit)?),
            };
            Ok(EngineQueryResult::History(history))
        }
        EngineQuery::Duplicates { path } => {
            find_duplicates(store, &path).map(EngineQueryResult::Duplicates)
        }
    }
}

/// Attach the caller's correlation ids to an error.
pub(crate) fn tag_error(err: ExError, ctx: &RequestContext) -> ExError {
    let err = err.with_request_id(ctx.request_id.clone());
    match &ctx.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}
