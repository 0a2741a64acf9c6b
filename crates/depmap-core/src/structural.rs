//! Orphans, coupling ranking and graph counters

use serde::{Deserialize, Serialize};

use crate::graph::DependencyGraph;

/// One ranked internal node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingEntry {
    pub node: String,
    /// Out-degree: distinct nodes this file depends on.
    pub dependencies: usize,
    /// In-degree: distinct nodes depending on this file.
    pub dependents: usize,
    pub score: usize,
}

/// Output of [`analyze_structure`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuralReport {
    /// Internal nodes with no edges at all, ascending by identity.
    pub orphans: Vec<String>,
    /// Internal nodes scoring above the threshold, highest score first,
    /// ties ascending by identity.
    pub coupling: Vec<CouplingEntry>,
    pub node_count: usize,
    pub edge_count: usize,
    pub internal_count: usize,
    pub external_count: usize,
}

/// Compute orphans and the coupling ranking. External nodes are counted but
/// never reported as orphans or ranked.
pub fn analyze_structure(graph: &DependencyGraph, coupling_threshold: usize) -> StructuralReport {
    let mut report = StructuralReport {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        ..StructuralReport::default()
    };

    for node in graph.nodes() {
        if node.is_external() {
            report.external_count += 1;
            continue;
        }
        report.internal_count += 1;

        let dependencies = graph.out_degree(node.id);
        let dependents = graph.in_degree(node.id);
        let score = dependencies + dependents;
        if score == 0 {
            report.orphans.push(node.identity.clone());
        }
        if score > coupling_threshold {
            report.coupling.push(CouplingEntry {
                node: node.identity.clone(),
                dependencies,
                dependents,
                score,
            });
        }
    }

    report.orphans.sort();
    report
        .coupling
        .sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.node.cmp(&b.node)));

    tracing::debug!(
        "Structure: {} orphans, {} ranked nodes above threshold {}",
        report.orphans.len(),
        report.coupling.len(),
        coupling_threshold
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::model::FileSummary;

    #[test]
    fn test_ranking_breaks_ties_by_identity() {
        let graph = build(&[
            FileSummary::new("hub", "").with_references(["x", "y", "z"]),
            FileSummary::new("y", "").with_references(["x"]),
            FileSummary::new("x", ""),
            FileSummary::new("z", ""),
        ]);
        let report = analyze_structure(&graph, 0);
        let ranking: Vec<(&str, usize)> = report
            .coupling
            .iter()
            .map(|e| (e.node.as_str(), e.score))
            .collect();
        assert_eq!(ranking, vec![("hub", 3), ("x", 2), ("y", 2), ("z", 1)]);
        assert!(report.orphans.is_empty());
    }

    #[test]
    fn test_threshold_filters_ranking() {
        let graph = build(&[
            FileSummary::new("a", "").with_references(["b", "c"]),
            FileSummary::new("b", ""),
            FileSummary::new("c", ""),
        ]);
        let report = analyze_structure(&graph, 1);
        assert_eq!(report.coupling.len(), 1);
        assert_eq!(report.coupling[0].node, "a");
        assert_eq!(report.coupling[0].dependencies, 2);
        assert_eq!(report.coupling[0].dependents, 0);
    }

    #[test]
    fn test_orphans_exclude_external_nodes() {
        let graph = build(&[
            FileSummary::new("lonely.go", "go"),
            FileSummary::new("app.go", "go").with_references(["fmt"]),
            FileSummary::new("alone.go", "go"),
        ]);
        let report = analyze_structure(&graph, 0);
        assert_eq!(report.orphans, vec!["alone.go", "lonely.go"]);
        assert_eq!(report.external_count, 1);
        assert_eq!(report.internal_count, 3);
        assert!(report.coupling.iter().all(|e| e.node != "fmt"));
    }

    #[test]
    fn test_self_edge_counts_both_directions() {
        let graph = build(&[FileSummary::new("a", "").with_references(["a"])]);
        let report = analyze_structure(&graph, 0);
        assert!(report.orphans.is_empty());
        assert_eq!(report.coupling[0].score, 2);
    }
}
