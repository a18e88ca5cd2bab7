//! Engine-level commands: snapshot capture and reconciliation.

#![allow(clippy::result_large_err)]

use tracing::info_span;
use vaultline_core::diff::render_plan_summary;
use vaultline_core::errors::Result;
use vaultline_core::snapshot::{
    compute_snapshot_digest, ReconcileOptions, ReconciliationPlan, Snapshot,
};
use vaultline_core::store::SecretStore;
use vaultline_core_types::RequestContext;

use crate::commands::engine_query::tag_error;
use crate::commands::snapshot::{capture_snapshot, reconcile_snapshot};

/// Engine-level commands.
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Capture every key under a directory.
    CaptureSnapshot { path: String },
    /// Make `target` match `snapshot`.
    ReconcileSnapshot {
        snapshot: Snapshot,
        target: String,
        options: ReconcileOptions,
    },
}

/// A captured snapshot and its digest.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    pub snapshot: Snapshot,
    /// Digest over the full snapshot, capture time included
    pub digest: String,
}

#[derive(Debug, Clone)]
pub struct ReconcileResult {
    pub plan: ReconciliationPlan,
    pub dry_run: bool,
    /// Rendered plan, as a preview when `dry_run`
    pub summary: String,
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    CaptureSnapshot(CaptureResult),
    ReconcileSnapshot(ReconcileResult),
}

/// Apply an engine command inside a span tagged with the request id.
///
/// Capture only reads; it is a command because its result is meant to be
/// persisted by the caller.
pub fn apply_engine_command(
    cmd: EngineCommand,
    store: &mut dyn SecretStore,
    ctx: &RequestContext,
) -> Result<EngineCommandResult> {
    let span = info_span!("engine_command", request_id = %ctx.request_id);
    let _guard = span.enter();

    let result = match cmd {
        EngineCommand::CaptureSnapshot { path } => {
            capture_snapshot(&*store, &path).and_then(|snapshot| {
                let digest = compute_snapshot_digest(&snapshot)?;
                Ok(EngineCommandResult::CaptureSnapshot(CaptureResult {
                    snapshot,
                    digest,
                }))
            })
        }
        EngineCommand::ReconcileSnapshot {
            snapshot,
            target,
            options,
        } => reconcile_snapshot(store, &snapshot, &target, options).map(|plan| {
            let summary = render_plan_summary(&plan, options.dry_run);
            EngineCommandResult::ReconcileSnapshot(ReconcileResult {
                plan,
                dry_run: options.dry_run,
                summary,
            })
        }),
    };
    result.map_err(|e| tag_error(e, ctx))
}
