//! Analysis configuration, passed explicitly into the engine

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cycles::CycleBudget;

pub const DEFAULT_REPORT_TOP_N: usize = 10;
pub const DEFAULT_MAX_CYCLES: usize = 10_000;
pub const DEFAULT_CYCLE_TIME_BUDGET_MS: u64 = 5_000;

/// Thresholds and budgets for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Nodes whose coupling score is strictly above this are ranked.
    pub coupling_threshold: usize,
    /// Rows shown in the report's coupling table.
    pub report_top_n: usize,
    /// Stop enumerating after this many cycles. `None` is unbounded.
    pub max_cycles: Option<usize>,
    /// Wall-clock budget for cycle enumeration. `None` is unbounded.
    pub cycle_time_budget_ms: Option<u64>,
    /// Run cycle detection and structural analysis on separate tasks.
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            coupling_threshold: 0,
            report_top_n: DEFAULT_REPORT_TOP_N,
            max_cycles: Some(DEFAULT_MAX_CYCLES),
            cycle_time_budget_ms: Some(DEFAULT_CYCLE_TIME_BUDGET_MS),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    /// No cycle or time limits.
    pub fn unbounded() -> Self {
        AnalysisConfig {
            max_cycles: None,
            cycle_time_budget_ms: None,
            ..Self::default()
        }
    }

    pub fn cycle_budget(&self) -> CycleBudget {
        CycleBudget {
            max_cycles: self.max_cycles,
            time_budget: self.cycle_time_budget_ms.map(Duration::from_millis),
        }
    }
}
