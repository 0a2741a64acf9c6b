//! Depmap Core: dependency graph model, import resolution, cycle detection
//! and structural analysis

pub mod model;
pub mod resolver;
pub mod graph;
pub mod builder;
pub mod cycles;
pub mod structural;
pub mod analysis;
pub mod config;
pub mod error;

#[cfg(test)]
pub mod tests;

pub use model::{NodeId, Language, NodeOrigin, Node, Edge, FileSummary, Diagnostic, Cycle};
pub use resolver::{ImportResolver, Resolution, normalize_identity};
pub use graph::DependencyGraph;
pub use builder::{BuildOutput, build, build_with_diagnostics};
pub use cycles::{CycleBudget, CycleReport, find_cycles, find_cycles_cancellable};
pub use structural::{CouplingEntry, StructuralReport, analyze_structure};
pub use analysis::{AnalysisResult, Counters, analyze, analyze_cancellable};
pub use config::AnalysisConfig;
pub use error::EngineError;
