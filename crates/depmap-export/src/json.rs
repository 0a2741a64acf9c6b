//! Structured JSON document

use depmap_core::{AnalysisResult, Cycle, Diagnostic};
use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::resolved_edges;

/// The JSON shape written by `--format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonDocument {
    pub file_count: usize,
    pub class_count: u64,
    pub dependency_count: usize,
    pub external_dependency_count: usize,
    pub partial: bool,
    pub circular_dependencies: Vec<Cycle>,
    pub orphaned_files: Vec<String>,
    pub highly_coupled_files: Vec<CoupledFile>,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoupledFile {
    pub node: String,
    pub score: usize,
    pub dependencies: usize,
    pub dependents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub external: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
    pub provenance: Vec<String>,
}

impl JsonDocument {
    pub fn from_result(result: &AnalysisResult) -> Result<Self, ExportError> {
        let edges = resolved_edges(result)?
            .into_iter()
            .map(|(source, target, edge)| EdgeRecord {
                from: source.identity.clone(),
                to: target.identity.clone(),
                provenance: edge.provenance.clone(),
            })
            .collect();

        Ok(JsonDocument {
            file_count: result.counters.file_count,
            class_count: result.counters.class_count,
            dependency_count: result.counters.edge_count,
            external_dependency_count: result.counters.external_dependency_count,
            partial: result.partial,
            circular_dependencies: result.cycles.clone(),
            orphaned_files: result.orphans.clone(),
            highly_coupled_files: result
                .coupling
                .iter()
                .map(|entry| CoupledFile {
                    node: entry.node.clone(),
                    score: entry.score,
                    dependencies: entry.dependencies,
                    dependents: entry.dependents,
                })
                .collect(),
            nodes: result
                .graph
                .nodes()
                .map(|node| NodeRecord {
                    id: node.identity.clone(),
                    language: node.language.clone(),
                    external: node.is_external(),
                })
                .collect(),
            edges,
            diagnostics: result.diagnostics.clone(),
        })
    }
}

pub(crate) fn render(result: &AnalysisResult) -> Result<String, ExportError> {
    let document = JsonDocument::from_result(result)?;
    Ok(serde_json::to_string_pretty(&document)?)
}
