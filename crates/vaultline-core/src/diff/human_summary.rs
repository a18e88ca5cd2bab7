//! Human-readable renderers for diffs, version changes and reconciliation
//! plans.
//!
//! Output is informational only. Values appear only in `ShowValues` mode
//! and are truncated to the configured display limit.

use crate::diff::model::{ChangeType, DiffResult, VersionChange};
use crate::snapshot::ReconciliationPlan;
use serde::{Deserialize, Serialize};

/// Default maximum displayed value length, in characters
pub const DEFAULT_DISPLAY_LIMIT: usize = 80;

const ELLIPSIS: &str = "...";

/// What a rendered diff shows for each key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryMode {
    /// Keys, plus old/new lengths for changed keys
    #[default]
    Full,
    /// Keys only
    KeysOnly,
    /// Keys with (truncated) values
    ShowValues,
    /// Counts only
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryOptions {
    pub mode: SummaryMode,
    pub display_limit: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            mode: SummaryMode::Full,
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

/// Names of the two compared sides, as shown in headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLabels {
    pub first: String,
    pub second: String,
}

impl DiffLabels {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Render a [`DiffResult`] as plain text.
pub fn render_human_summary(diff: &DiffResult, labels: &DiffLabels, options: &SummaryOptions) -> String {
    if options.mode == SummaryMode::Summary {
        return render_counts(diff);
    }

    let limit = options.display_limit;
    let show_values = options.mode == SummaryMode::ShowValues;
    let mut out = String::new();

    out.push_str(&format!("Comparing {} → {}\n\n", labels.first, labels.second));

    if !diff.has_differences() {
        out.push_str("Paths are identical\n");
        return out;
    }

    if !diff.only_in_first.is_empty() {
        out.push_str(&format!("Only in {}:\n", labels.first));
        for entry in &diff.only_in_first {
            if show_values {
                out.push_str(&format!(
                    "  - {}: {}\n",
                    entry.key,
                    truncate_value(entry.value.expose(), limit)
                ));
            } else {
                out.push_str(&format!("  - {}\n", entry.key));
            }
        }
        out.push('\n');
    }

    if !diff.only_in_second.is_empty() {
        out.push_str(&format!("Only in {}:\n", labels.second));
        for entry in &diff.only_in_second {
            if show_values {
                out.push_str(&format!(
                    "  + {}: {}\n",
                    entry.key,
                    truncate_value(entry.value.expose(), limit)
                ));
            } else {
                out.push_str(&format!("  + {}\n", entry.key));
            }
        }
        out.push('\n');
    }

    if !diff.changed.is_empty() {
        out.push_str("Changed:\n");
        for entry in &diff.changed {
            match options.mode {
                SummaryMode::ShowValues => {
                    out.push_str(&format!("  ~ {}:\n", entry.key));
                    out.push_str(&format!(
                        "      - {}\n",
                        truncate_value(entry.first_value.expose(), limit)
                    ));
                    out.push_str(&format!(
                        "      + {}\n",
                        truncate_value(entry.second_value.expose(), limit)
                    ));
                }
                SummaryMode::KeysOnly => out.push_str(&format!("  ~ {}\n", entry.key)),
                _ => out.push_str(&format!(
                    "  ~ {} ({} → {} chars)\n",
                    entry.key, entry.first_len, entry.second_len
                )),
            }
        }
        out.push('\n');
    }

    out.push_str(&format!("Unchanged: {} keys\n", diff.unchanged));
    out
}

fn render_counts(diff: &DiffResult) -> String {
    format!(
        "Total keys: {}\n  Only in first:  {}\n  Only in second: {}\n  Changed:        {}\n  Unchanged:      {}\n",
        diff.total_keys(),
        diff.only_in_first.len(),
        diff.only_in_second.len(),
        diff.changed.len(),
        diff.unchanged
    )
}

/// One-line rendering of a field change inside a history listing.
pub fn format_version_change(change: &VersionChange, show_values: bool, limit: usize) -> String {
    let value = |v: &Option<vaultline_core_types::Sensitive<String>>| {
        v.as_ref()
            .map(|s| truncate_value(s.expose(), limit))
            .unwrap_or_default()
    };
    match (change.change_type, show_values) {
        (ChangeType::Added, true) => format!("+ {}: {}", change.key, value(&change.new_value)),
        (ChangeType::Added, false) => format!("+ {}", change.key),
        (ChangeType::Modified, true) => format!(
            "~ {}: {} → {}",
            change.key,
            value(&change.old_value),
            value(&change.new_value)
        ),
        (ChangeType::Modified, false) => format!(
            "~ {} ({} → {} chars)",
            change.key, change.old_len, change.new_len
        ),
        (ChangeType::Deleted, true) => format!("- {}: {}", change.key, value(&change.old_value)),
        (ChangeType::Deleted, false) => format!("- {}", change.key),
    }
}

/// Render a reconciliation plan, as a preview when `dry_run`.
pub fn render_plan_summary(plan: &ReconciliationPlan, dry_run: bool) -> String {
    let mut out = String::new();
    if dry_run {
        out.push_str("Preview of restore operation (dry-run):\n\n");
    } else {
        out.push_str("Restore completed:\n\n");
    }

    let sections: [(&str, &str, &[String]); 4] = [
        ("Added", "+", &plan.added),
        ("Updated", "~", &plan.updated),
        ("Deleted", "-", &plan.deleted),
        ("Skipped (version mismatch)", "!", &plan.skipped),
    ];
    for (title, marker, keys) in sections {
        if keys.is_empty() {
            continue;
        }
        out.push_str(&format!("{} ({}):\n", title, keys.len()));
        for key in keys {
            out.push_str(&format!("  {} {}\n", marker, key));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Summary: {} added, {} updated, {} deleted, {} unchanged",
        plan.added.len(),
        plan.updated.len(),
        plan.deleted.len(),
        plan.unchanged.len()
    ));
    if !plan.skipped.is_empty() {
        out.push_str(&format!(", {} skipped", plan.skipped.len()));
    }
    out.push('\n');

    if dry_run && plan.has_changes() {
        out.push_str("\nRun without dry-run to apply these changes.\n");
    }
    out
}

/// Escape newlines and cut to `limit` characters, ending in `...` when cut.
pub fn truncate_value(value: &str, limit: usize) -> String {
    let escaped = value.replace('\n', "\\n");
    if escaped.chars().count() <= limit {
        return escaped;
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let mut out: String = escaped.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
