//! Unit tests for depmap-core module

use crate::*;

fn summary(path: &str, refs: &[&str]) -> FileSummary {
    FileSummary::new(path, "").with_references(refs.iter().copied())
}

fn unbounded() -> AnalysisConfig {
    AnalysisConfig::unbounded()
}

#[test]
fn test_two_files_one_edge() {
    let result = analyze(&[summary("A", &["B"]), summary("B", &[])], &unbounded()).unwrap();

    assert_eq!(result.counters.internal_count, 2);
    assert_eq!(result.counters.edge_count, 1);
    assert!(result.cycles.is_empty());
    assert!(result.orphans.is_empty());

    let ranking: Vec<(&str, usize)> = result
        .coupling
        .iter()
        .map(|e| (e.node.as_str(), e.score))
        .collect();
    assert_eq!(ranking, vec![("A", 1), ("B", 1)]);
}

#[test]
fn test_three_file_ring() {
    let result = analyze(
        &[summary("B", &["C"]), summary("C", &["A"]), summary("A", &["B"])],
        &unbounded(),
    )
    .unwrap();

    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].nodes(), ["A", "B", "C"]);
    assert_eq!(result.cycles[0].display_path(), "A -> B -> C -> A");
    assert_eq!(result.counters.cycle_count, 1);
}

#[test]
fn test_external_package_reference() {
    let result = analyze(
        &[FileSummary::new("A", "javascript").with_references(["left-pad"])],
        &unbounded(),
    )
    .unwrap();

    let a = result.graph.node_by_identity("A").unwrap();
    let pad = result.graph.node_by_identity("left-pad").unwrap();
    assert!(a.is_internal());
    assert!(pad.is_external());
    assert!(result.orphans.is_empty());
    assert!(result.coupling.iter().all(|e| e.node != "left-pad"));
    assert_eq!(result.counters.external_dependency_count, 1);
}

#[test]
fn test_self_import() {
    let result = analyze(&[summary("A", &["A"])], &unbounded()).unwrap();

    assert_eq!(result.counters.edge_count, 1);
    let a = result.graph.node_by_identity("A").unwrap().id;
    assert!(result.graph.edge_between(a, a).unwrap().is_self_edge());
    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].nodes(), ["A"]);
}

#[test]
fn test_cycle_budget_exceeded() {
    let names: Vec<String> = (0..9).map(|i| format!("n{}", i)).collect();
    let summaries: Vec<FileSummary> = names
        .iter()
        .map(|n| summary(n, &names.iter().filter(|m| *m != n).map(String::as_str).collect::<Vec<_>>()))
        .collect();
    let config = AnalysisConfig {
        max_cycles: Some(50),
        cycle_time_budget_ms: Some(10_000),
        ..AnalysisConfig::default()
    };

    let result = analyze(&summaries, &config).unwrap();
    assert!(result.partial);
    assert_eq!(result.cycles.len(), 50);
    assert_eq!(result.counters.cycle_count, 50);
}

#[test]
fn test_empty_input() {
    let result = analyze(&[], &AnalysisConfig::default()).unwrap();
    assert_eq!(result.counters, Counters::default());
    assert!(result.cycles.is_empty());
    assert!(result.orphans.is_empty());
    assert!(!result.partial);
}

#[test]
fn test_malformed_summary_is_reported_by_index() {
    let result = analyze(
        &[summary("a.rs", &[]), summary("  ", &["a.rs"]), summary("b.rs", &[])],
        &unbounded(),
    )
    .unwrap();

    assert_eq!(result.counters.file_count, 2);
    assert_eq!(result.counters.rejected_count, 1);
    assert_eq!(result.diagnostics[0].index, 1);
    assert_eq!(result.orphans, vec!["a.rs", "b.rs"]);
}

#[test]
fn test_sequential_and_parallel_agree() {
    let summaries = vec![
        summary("a", &["b", "c"]),
        summary("b", &["c", "a"]),
        summary("c", &["a", "ext"]),
        summary("d", &[]),
    ];
    let parallel = analyze(&summaries, &unbounded()).unwrap();
    let sequential = analyze(
        &summaries,
        &AnalysisConfig {
            parallel: false,
            ..unbounded()
        },
    )
    .unwrap();

    assert_eq!(parallel.cycles, sequential.cycles);
    assert_eq!(parallel.coupling, sequential.coupling);
    assert_eq!(parallel.orphans, sequential.orphans);
    assert_eq!(parallel.counters, sequential.counters);
}

#[test]
fn test_top_coupled_clamps() {
    let result = analyze(&[summary("a", &["b"]), summary("b", &[])], &unbounded()).unwrap();
    assert_eq!(result.top_coupled(10).len(), 2);
    assert_eq!(result.top_coupled(1)[0].node, "a");
}

#[test]
fn test_file_summary_deserialization() {
    let json = r#"[
        {"path": "src/a.ts", "language": "typescript", "imports": ["./b"], "classes": 2},
        {"language": "typescript"}
    ]"#;
    let summaries: Vec<FileSummary> = serde_json::from_str(json).unwrap();
    assert_eq!(summaries[0].references, vec!["./b"]);
    assert_eq!(summaries[0].classes, Some(2));
    assert_eq!(summaries[1].path, "");
}
