//! CLI command implementations

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use depmap_core::{AnalysisConfig, AnalysisResult, FileSummary};
use depmap_export::{ExportFormat, Exporter, render_all};
use serde::Deserialize;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON file of file summaries (`-` reads stdin)
    pub input: PathBuf,

    /// Output format, repeatable: json, dot, mermaid, markdown
    #[arg(short, long = "format", value_name = "FORMAT")]
    pub formats: Vec<ExportFormat>,

    /// Write to this file. With several formats, the extension is replaced per format.
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Write `dependency_map.<ext>` per format into this directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Rank only files whose coupling score is above this
    #[arg(long, value_name = "N")]
    pub coupling_threshold: Option<usize>,

    /// Rows in the report's coupling table
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Stop cycle enumeration after this many cycles
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<usize>,

    /// Wall-clock budget for cycle enumeration in milliseconds
    #[arg(long, value_name = "MS")]
    pub time_budget_ms: Option<u64>,
}

/// Input documents are either a bare array or `{ "files": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SummaryDocument {
    List(Vec<FileSummary>),
    Wrapped { files: Vec<FileSummary> },
}

pub fn analyze(args: AnalyzeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = match config_path {
        Some(path) => crate::config::load(path)?,
        None => AnalysisConfig::default(),
    };
    apply_overrides(&mut config, &args);

    let summaries = load_summaries(&args.input)?;
    tracing::info!("Loaded {} file summaries", summaries.len());

    let result = depmap_core::analyze(&summaries, &config).context("Analysis failed")?;
    log_result(&result);

    let formats = requested_formats(&args.formats);
    let exporters: Vec<Exporter> = formats
        .iter()
        .map(|format| Exporter::new(*format, &config))
        .collect();
    let rendered = render_all(&result, &exporters)?;

    match (&args.output_dir, &args.output) {
        (Some(dir), _) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
            for (format, text) in &rendered {
                write_output(&dir.join(format.default_file_name()), text)?;
            }
        }
        (None, Some(path)) if rendered.len() == 1 => {
            write_output(path, &rendered[0].1)?;
        }
        (None, Some(path)) => {
            for (format, text) in &rendered {
                let ext = format.extension().trim_start_matches('.');
                write_output(&path.with_extension(ext), text)?;
            }
        }
        (None, None) if rendered.len() == 1 => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered[0].1.as_bytes())
                .context("Failed to write to stdout")?;
        }
        (None, None) => {
            for (format, text) in &rendered {
                write_output(Path::new(&format.default_file_name()), text)?;
            }
        }
    }

    Ok(())
}

pub fn formats() {
    for format in ExportFormat::all() {
        println!("{:<10} {}", format.as_str(), format.extension());
    }
}

fn apply_overrides(config: &mut AnalysisConfig, args: &AnalyzeArgs) {
    if let Some(threshold) = args.coupling_threshold {
        config.coupling_threshold = threshold;
    }
    if let Some(top) = args.top {
        config.report_top_n = top;
    }
    if let Some(max) = args.max_cycles {
        config.max_cycles = Some(max);
    }
    if let Some(ms) = args.time_budget_ms {
        config.cycle_time_budget_ms = Some(ms);
    }
}

/// Requested formats in first-mention order, defaulting to JSON.
fn requested_formats(formats: &[ExportFormat]) -> Vec<ExportFormat> {
    let mut unique = Vec::with_capacity(formats.len().max(1));
    for format in formats {
        if !unique.contains(format) {
            unique.push(*format);
        }
    }
    if unique.is_empty() {
        unique.push(ExportFormat::Json);
    }
    unique
}

fn load_summaries(input: &Path) -> Result<Vec<FileSummary>> {
    let text = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read summaries from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };

    let document: SummaryDocument = serde_json::from_str(&text)
        .with_context(|| format!("Invalid summary document {}", input.display()))?;
    Ok(match document {
        SummaryDocument::List(files) | SummaryDocument::Wrapped { files } => files,
    })
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Wrote {}", path.display());
    Ok(())
}

fn log_result(result: &AnalysisResult) {
    let c = &result.counters;
    tracing::info!(
        "Analyzed {} files: {} dependencies, {} external, {} cycles, {} orphans",
        c.file_count,
        c.edge_count,
        c.external_dependency_count,
        c.cycle_count,
        c.orphan_count
    );
    if c.rejected_count > 0 {
        tracing::warn!("{} file summaries were rejected", c.rejected_count);
    }
    if result.partial {
        tracing::warn!("Cycle enumeration hit its budget; the cycle list is incomplete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_formats_dedup_and_default() {
        assert_eq!(requested_formats(&[]), vec![ExportFormat::Json]);
        assert_eq!(
            requested_formats(&[
                ExportFormat::Dot,
                ExportFormat::Json,
                ExportFormat::Dot
            ]),
            vec![ExportFormat::Dot, ExportFormat::Json]
        );
    }

    #[test]
    fn test_summary_document_shapes() {
        let bare: SummaryDocument =
            serde_json::from_str(r#"[{"path": "a.py", "language": "python"}]"#).unwrap();
        let wrapped: SummaryDocument =
            serde_json::from_str(r#"{"files": [{"path": "a.py", "imports": ["b"]}]}"#).unwrap();
        assert!(matches!(bare, SummaryDocument::List(ref f) if f.len() == 1));
        assert!(matches!(wrapped, SummaryDocument::Wrapped { ref files } if files[0].references == ["b"]));
    }
}
