//! Graph construction from file summaries

use std::collections::HashSet;

use crate::graph::DependencyGraph;
use crate::model::{Diagnostic, FileSummary, Language, NodeOrigin};
use crate::resolver::{ImportResolver, Resolution, normalize_identity};

/// Everything the builder produces besides the graph itself.
#[derive(Debug)]
pub struct BuildOutput {
    pub graph: DependencyGraph,
    /// Summaries that were rejected, in input order.
    pub diagnostics: Vec<Diagnostic>,
    /// Accepted summaries.
    pub file_count: usize,
    /// Sum of the accepted summaries' class counts.
    pub class_count: u64,
}

/// Build the dependency graph, discarding diagnostics.
pub fn build(summaries: &[FileSummary]) -> DependencyGraph {
    build_with_diagnostics(summaries).graph
}

/// Build the dependency graph and report rejected summaries.
///
/// Accepted summaries are processed in identity order, so the resulting node
/// order does not depend on the order of `summaries`.
pub fn build_with_diagnostics(summaries: &[FileSummary]) -> BuildOutput {
    let mut diagnostics = Vec::new();
    let mut seen = HashSet::new();
    let mut accepted: Vec<(String, &FileSummary)> = Vec::with_capacity(summaries.len());

    for (index, summary) in summaries.iter().enumerate() {
        let identity = normalize_identity(&summary.path);
        let reason = if identity.is_empty() {
            Some("missing or empty path")
        } else if !seen.insert(identity.clone()) {
            Some("duplicate path identity")
        } else {
            None
        };
        match reason {
            Some(reason) => {
                tracing::warn!("Skipping file summary #{} ({:?}): {}", index, summary.path, reason);
                diagnostics.push(Diagnostic {
                    index,
                    path: summary.path.clone(),
                    reason: reason.to_string(),
                });
            }
            None => accepted.push((identity, summary)),
        }
    }

    accepted.sort_by(|a, b| a.0.cmp(&b.0));

    let resolver = ImportResolver::new(accepted.iter().map(|(identity, _)| identity.clone()));
    let mut graph = DependencyGraph::new();

    for (identity, summary) in &accepted {
        graph.ensure_node(identity, language_tag(summary, identity), NodeOrigin::Internal);
    }

    let mut skipped = 0usize;
    for (identity, summary) in &accepted {
        let language = Language::detect(&summary.language, identity);
        let Some(source) = graph.node_by_identity(identity).map(|n| n.id) else {
            continue;
        };
        for raw in &summary.references {
            let Some(resolution) = resolver.resolve(identity, language, raw) else {
                skipped += 1;
                continue;
            };
            let target = match &resolution {
                Resolution::Internal(id) => graph.ensure_node(id, None, NodeOrigin::Internal),
                Resolution::External(id) => graph.ensure_node(id, None, NodeOrigin::External),
            };
            graph.link(source, target, raw.clone());
        }
    }

    if skipped > 0 {
        tracing::debug!("Ignored {} blank references", skipped);
    }
    tracing::debug!(
        "Built dependency graph: {} nodes ({} internal), {} edges",
        graph.node_count(),
        accepted.len(),
        graph.edge_count()
    );

    let class_count = accepted
        .iter()
        .map(|(_, s)| u64::from(s.classes.unwrap_or(0)))
        .sum();

    BuildOutput {
        graph,
        diagnostics,
        file_count: accepted.len(),
        class_count,
    }
}

/// The caller's tag, or the detected language when the tag is blank.
fn language_tag(summary: &FileSummary, identity: &str) -> Option<String> {
    let tag = summary.language.trim();
    if !tag.is_empty() {
        return Some(tag.to_string());
    }
    match Language::detect(tag, identity) {
        Language::Other => None,
        lang => Some(lang.as_str().to_string()),
    }
}
