//! Human-readable Markdown report

use std::fmt::Write;

use depmap_core::AnalysisResult;

use crate::TRUNCATION_NOTICE;
use crate::error::ExportError;

pub(crate) fn render(result: &AnalysisResult, top_n: usize) -> Result<String, ExportError> {
    let c = &result.counters;
    let mut out = String::from("# Dependency Analysis\n\n");

    if result.partial {
        let _ = writeln!(out, "> **Note:** {}.\n", TRUNCATION_NOTICE);
    }

    out.push_str("## Summary\n\n");
    out.push_str("|Metric|Count|\n");
    out.push_str("|---|---:|\n");
    let rows: [(&str, String); 8] = [
        ("Files", c.file_count.to_string()),
        ("Classes", c.class_count.to_string()),
        ("Dependencies", c.edge_count.to_string()),
        ("Internal nodes", c.internal_count.to_string()),
        ("External dependencies", c.external_dependency_count.to_string()),
        (
            "Circular dependencies",
            if result.partial {
                format!("{}+", c.cycle_count)
            } else {
                c.cycle_count.to_string()
            },
        ),
        ("Orphaned files", c.orphan_count.to_string()),
        ("Rejected summaries", c.rejected_count.to_string()),
    ];
    for (metric, value) in &rows {
        let _ = writeln!(out, "|{}|{}|", metric, value);
    }
    out.push('\n');

    out.push_str("## Highly Coupled Files\n\n");
    let top = result.top_coupled(top_n);
    if top.is_empty() {
        out.push_str("- None.\n\n");
    } else {
        out.push_str("|File|Dependencies|Dependents|Score|\n");
        out.push_str("|---|---:|---:|---:|\n");
        for entry in top {
            let _ = writeln!(
                out,
                "|{}|{}|{}|{}|",
                cell(&code(&entry.node)),
                entry.dependencies,
                entry.dependents,
                entry.score
            );
        }
        if result.coupling.len() > top.len() {
            let _ = writeln!(
                out,
                "\n_{} more not shown._",
                result.coupling.len() - top.len()
            );
        }
        out.push('\n');
    }

    out.push_str("## Circular Dependencies\n\n");
    if result.cycles.is_empty() {
        out.push_str("- None.\n\n");
    } else {
        for cycle in &result.cycles {
            let _ = writeln!(out, "- {}", code(&cycle.display_path()));
        }
        out.push('\n');
    }

    out.push_str("## Orphaned Files\n\n");
    if result.orphans.is_empty() {
        out.push_str("- None.\n\n");
    } else {
        for orphan in &result.orphans {
            let _ = writeln!(out, "- {}", code(orphan));
        }
        out.push('\n');
    }

    if !result.diagnostics.is_empty() {
        out.push_str("## Rejected Summaries\n\n");
        for diagnostic in &result.diagnostics {
            let _ = writeln!(out, "- {}", diagnostic);
        }
        out.push('\n');
    }

    Ok(out)
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Inline code span whose fence is one backtick longer than the longest
/// backtick run in `text`.
fn code(text: &str) -> String {
    let longest = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{} {} {}", fence, text, fence)
    } else {
        format!("{}{}{}", fence, text, fence)
    }
}
