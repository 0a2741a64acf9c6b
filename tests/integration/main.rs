//! Integration tests for Depmap
//!
//! These tests drive the built binary end to end and check that the core
//! engine and the exporters agree with each other.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use depmap_core::{AnalysisConfig, FileSummary, analyze};
use depmap_export::{ExportFormat, Exporter, JsonDocument, render_all};
use tempfile::TempDir;

const PROJECT: &str = r#"[
    {"path": "src/app.ts", "language": "typescript", "imports": ["./utils/helper", "react"], "classes": 2},
    {"path": "src/utils/helper.ts", "language": "typescript", "imports": ["../app"]},
    {"path": "src/unused.ts", "language": "typescript", "imports": []},
    {"path": "", "language": "typescript", "imports": ["./app"]}
]"#;

fn depmap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_depmap"))
        .args(args)
        .output()
        .expect("Failed to execute depmap")
}

fn write_input(dir: &Path, text: &str) -> String {
    let path = dir.join("summaries.json");
    fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_help() {
    let output = depmap(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("formats"));
}

#[test]
fn test_version_and_formats() {
    let output = depmap(&["version"]);
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));

    let output = depmap(&["formats"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    for ext in [".json", ".dot", ".mmd", ".md"] {
        assert!(stdout.contains(ext), "missing {}", ext);
    }
}

/// JSON goes to stdout by default and logs stay on stderr
#[test]
fn test_analyze_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), PROJECT);

    let output = depmap(&["analyze", &input]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let doc: JsonDocument = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc.file_count, 3);
    assert_eq!(doc.class_count, 2);
    assert_eq!(doc.external_dependency_count, 1);
    assert_eq!(doc.circular_dependencies.len(), 1);
    assert_eq!(
        doc.circular_dependencies[0].nodes(),
        ["src/app.ts", "src/utils/helper.ts"]
    );
    assert_eq!(doc.orphaned_files, vec!["src/unused.ts"]);
    assert_eq!(doc.diagnostics.len(), 1);
    assert_eq!(doc.diagnostics[0].index, 3);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("#3"));
}

#[test]
fn test_output_dir_writes_every_format() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), PROJECT);
    let out_dir = temp_dir.path().join("out");

    let output = depmap(&[
        "analyze",
        &input,
        "--format",
        "json",
        "--format",
        "dot",
        "--format",
        "mmd",
        "--format",
        "md",
        "--output-dir",
        out_dir.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty());

    for format in ExportFormat::all() {
        let path = out_dir.join(format.default_file_name());
        assert!(path.exists(), "{} was not written", path.display());
    }

    let dot = fs::read_to_string(out_dir.join("dependency_map.dot")).unwrap();
    assert!(dot.contains("\"src/app.ts\" -> \"src/utils/helper.ts\";"));
    assert!(dot.contains("\"react\" [style=dashed];"));

    let report = fs::read_to_string(out_dir.join("dependency_map.md")).unwrap();
    assert!(report.contains("- `src/app.ts -> src/utils/helper.ts -> src/app.ts`"));
    assert!(report.contains("## Rejected Summaries"));
}

#[test]
fn test_config_file_and_flag_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), PROJECT);
    let config = temp_dir.path().join("depmap.yaml");
    fs::write(&config, "dependency_map:\n  coupling_threshold: 10\n").unwrap();

    let output = depmap(&["--config", config.to_str().unwrap(), "analyze", &input]);
    let doc: JsonDocument = serde_json::from_slice(&output.stdout).unwrap();
    assert!(doc.highly_coupled_files.is_empty());

    let output = depmap(&[
        "--config",
        config.to_str().unwrap(),
        "analyze",
        &input,
        "--coupling-threshold",
        "2",
    ]);
    let doc: JsonDocument = serde_json::from_slice(&output.stdout).unwrap();
    let ranked: Vec<&str> = doc
        .highly_coupled_files
        .iter()
        .map(|f| f.node.as_str())
        .collect();
    assert_eq!(ranked, vec!["src/app.ts"]);
}

/// Scenario: a dense graph with a tiny cycle budget completes and says so
#[test]
fn test_cycle_budget_marks_partial() {
    let names: Vec<String> = (0..8).map(|i| format!("m{}.py", i)).collect();
    let summaries: Vec<FileSummary> = names
        .iter()
        .map(|n| {
            FileSummary::new(n.clone(), "python").with_references(
                names
                    .iter()
                    .filter(|m| *m != n)
                    .map(|m| m.trim_end_matches(".py").to_string()),
            )
        })
        .collect();
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), &serde_json::to_string(&summaries).unwrap());

    let output = depmap(&["analyze", &input, "--max-cycles", "25", "--format", "markdown"]);
    assert!(output.status.success());
    let report = String::from_utf8_lossy(&output.stdout);
    assert!(report.contains("results truncated"));
    assert!(report.contains("|Circular dependencies|25+|"));
}

#[test]
fn test_bad_input_fails() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "{ not json");
    let output = depmap(&["analyze", &input]);
    assert!(!output.status.success());

    let output = depmap(&["analyze", "/nonexistent/summaries.json"]);
    assert!(!output.status.success());

    let output = depmap(&["analyze", &input, "--format", "yaml"]);
    assert!(!output.status.success());
}

/// The JSON document agrees with the result it was rendered from
#[test]
fn test_json_round_trip_counts() {
    let summaries: Vec<FileSummary> = serde_json::from_str(PROJECT).unwrap();
    let result = analyze(&summaries, &AnalysisConfig::default()).unwrap();
    let rendered = render_all(&result, &[Exporter::Json]).unwrap();
    let doc: JsonDocument = serde_json::from_str(&rendered[0].1).unwrap();

    assert_eq!(doc.dependency_count, result.graph.edge_count());
    assert_eq!(doc.circular_dependencies.len(), result.cycles.len());
    assert_eq!(doc.nodes.len(), result.graph.node_count());
    assert_eq!(doc.edges.len(), result.graph.edge_count());
}

/// Two runs over the same input produce byte-identical documents
#[test]
fn test_repeat_runs_are_identical() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), PROJECT);
    for format in ["json", "dot", "mermaid", "markdown"] {
        let first = depmap(&["analyze", &input, "--format", format]);
        let second = depmap(&["analyze", &input, "--format", format]);
        assert_eq!(first.stdout, second.stdout, "{} differs between runs", format);
    }
}
