//! Analysis entry point: build, then detect cycles and analyze structure

use std::sync::atomic::AtomicBool;

use serde::{Deserialize, Serialize};

use crate::builder::build_with_diagnostics;
use crate::config::AnalysisConfig;
use crate::cycles::{CycleReport, find_cycles, find_cycles_cancellable};
use crate::error::EngineError;
use crate::graph::DependencyGraph;
use crate::model::{Cycle, Diagnostic, FileSummary};
use crate::structural::{CouplingEntry, StructuralReport, analyze_structure};

/// Summary counters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counters {
    pub file_count: usize,
    pub class_count: u64,
    pub node_count: usize,
    pub edge_count: usize,
    pub internal_count: usize,
    pub external_count: usize,
    /// Distinct references that did not resolve to a scanned file.
    pub external_dependency_count: usize,
    pub cycle_count: usize,
    pub orphan_count: usize,
    pub rejected_count: usize,
}

/// Everything one analysis pass produces. Built once, then only read.
#[derive(Debug)]
pub struct AnalysisResult {
    pub graph: DependencyGraph,
    /// Canonical cycles in ascending order.
    pub cycles: Vec<Cycle>,
    /// Cycle enumeration hit its budget; `cycles` is incomplete.
    pub partial: bool,
    pub orphans: Vec<String>,
    pub coupling: Vec<CouplingEntry>,
    pub counters: Counters,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the full analysis over `summaries`.
pub fn analyze(
    summaries: &[FileSummary],
    config: &AnalysisConfig,
) -> Result<AnalysisResult, EngineError> {
    run(summaries, config, None)
}

/// Like [`analyze`], with cycle enumeration stopping once `cancel` is set.
pub fn analyze_cancellable(
    summaries: &[FileSummary],
    config: &AnalysisConfig,
    cancel: &AtomicBool,
) -> Result<AnalysisResult, EngineError> {
    run(summaries, config, Some(cancel))
}

fn run(
    summaries: &[FileSummary],
    config: &AnalysisConfig,
    cancel: Option<&AtomicBool>,
) -> Result<AnalysisResult, EngineError> {
    let built = build_with_diagnostics(summaries);
    built.graph.verify()?;

    let graph = &built.graph;
    let budget = config.cycle_budget();
    let detect = || match cancel {
        Some(flag) => find_cycles_cancellable(graph, budget, flag),
        None => find_cycles(graph, budget),
    };
    let inspect = || analyze_structure(graph, config.coupling_threshold);

    let (cycle_report, structure): (CycleReport, StructuralReport) = if config.parallel {
        rayon::join(detect, inspect)
    } else {
        (detect(), inspect())
    };

    if structure.node_count != graph.node_count() || structure.edge_count != graph.edge_count() {
        return Err(EngineError::inconsistent(
            "structural counts disagree with the built graph",
        ));
    }

    let counters = Counters {
        file_count: built.file_count,
        class_count: built.class_count,
        node_count: structure.node_count,
        edge_count: structure.edge_count,
        internal_count: structure.internal_count,
        external_count: structure.external_count,
        external_dependency_count: structure.external_count,
        cycle_count: cycle_report.cycles.len(),
        orphan_count: structure.orphans.len(),
        rejected_count: built.diagnostics.len(),
    };

    tracing::debug!(
        "Analysis complete: {} files, {} dependencies, {} cycles{}",
        counters.file_count,
        counters.edge_count,
        counters.cycle_count,
        if cycle_report.partial { " (partial)" } else { "" }
    );

    Ok(AnalysisResult {
        graph: built.graph,
        cycles: cycle_report.cycles,
        partial: cycle_report.partial,
        orphans: structure.orphans,
        coupling: structure.coupling,
        counters,
        diagnostics: built.diagnostics,
    })
}

impl AnalysisResult {
    /// The `n` most coupled internal nodes.
    pub fn top_coupled(&self, n: usize) -> &[CouplingEntry] {
        &self.coupling[..n.min(self.coupling.len())]
    }
}
