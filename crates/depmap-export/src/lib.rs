//! Depmap Export: renders an analysis result as JSON, Graphviz DOT,
//! Mermaid or a Markdown report

pub mod error;
pub mod format;

mod dot;
mod json;
mod markdown;
mod mermaid;

use depmap_core::{AnalysisConfig, AnalysisResult, Edge, Node};
use rayon::prelude::*;

pub use error::ExportError;
pub use format::ExportFormat;
pub use json::JsonDocument;

/// Line used by every format when cycle enumeration was cut short.
pub const TRUNCATION_NOTICE: &str =
    "results truncated: cycle enumeration stopped at its budget, the cycle list is incomplete";

/// One renderer per output format. Renderers hold only their own options and
/// never mutate the result, so any number can run against it at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exporter {
    Json,
    Dot,
    Mermaid,
    Report { top_n: usize },
}

impl Exporter {
    pub fn new(format: ExportFormat, config: &AnalysisConfig) -> Self {
        match format {
            ExportFormat::Json => Exporter::Json,
            ExportFormat::Dot => Exporter::Dot,
            ExportFormat::Mermaid => Exporter::Mermaid,
            ExportFormat::Markdown => Exporter::Report {
                top_n: config.report_top_n,
            },
        }
    }

    pub fn format(&self) -> ExportFormat {
        match self {
            Exporter::Json => ExportFormat::Json,
            Exporter::Dot => ExportFormat::Dot,
            Exporter::Mermaid => ExportFormat::Mermaid,
            Exporter::Report { .. } => ExportFormat::Markdown,
        }
    }

    pub fn render(&self, result: &AnalysisResult) -> Result<String, ExportError> {
        match self {
            Exporter::Json => json::render(result),
            Exporter::Dot => dot::render(result),
            Exporter::Mermaid => mermaid::render(result),
            Exporter::Report { top_n } => markdown::render(result, *top_n),
        }
    }
}

/// Render `result` with every exporter in parallel, keeping input order.
pub fn render_all(
    result: &AnalysisResult,
    exporters: &[Exporter],
) -> Result<Vec<(ExportFormat, String)>, ExportError> {
    exporters
        .par_iter()
        .map(|exporter| {
            let text = exporter.render(result)?;
            tracing::debug!("Rendered {} ({} bytes)", exporter.format(), text.len());
            Ok((exporter.format(), text))
        })
        .collect()
}

/// Edges ordered by (source identity, target identity) with both endpoints
/// looked up. A missing endpoint is an internal consistency failure.
pub(crate) fn resolved_edges(
    result: &AnalysisResult,
) -> Result<Vec<(&Node, &Node, &Edge)>, ExportError> {
    let graph = &result.graph;
    graph
        .sorted_edges()
        .into_iter()
        .map(|edge| {
            let source = graph
                .node(edge.source)
                .ok_or(ExportError::MissingNode(edge.source))?;
            let target = graph
                .node(edge.target)
                .ok_or(ExportError::MissingNode(edge.target))?;
            Ok((source, target, edge))
        })
        .collect()
}
