//! Mermaid flowchart output

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use depmap_core::{AnalysisResult, DependencyGraph};

use crate::error::ExportError;
use crate::{TRUNCATION_NOTICE, resolved_edges};

const MAX_ID_LEN: usize = 50;

/// Flowchart keywords that cannot stand as a bare node id.
const RESERVED_IDS: &[&str] = &[
    "end", "graph", "flowchart", "subgraph", "direction", "classDef", "class", "style",
    "linkStyle", "click", "call", "href",
];

pub(crate) fn render(result: &AnalysisResult) -> Result<String, ExportError> {
    let graph = &result.graph;
    let edges = resolved_edges(result)?;
    let ids = assign_ids(graph);

    let mut out = String::from("graph TD\n");
    if result.partial {
        let _ = writeln!(out, "    %% {}", TRUNCATION_NOTICE);
    }

    for node in graph.nodes() {
        let _ = write!(out, "    {}[\"{}\"]", id_of(&ids, &node.identity), label(&node.identity));
        if node.is_external() {
            out.push_str(":::external");
        }
        out.push('\n');
    }

    for (source, target, _) in &edges {
        let _ = writeln!(
            out,
            "    {} --> {}",
            id_of(&ids, &source.identity),
            id_of(&ids, &target.identity)
        );
    }

    if graph.external_count() > 0 {
        let _ = writeln!(out, "    classDef external stroke-dasharray: 5 5");
    }

    if !result.cycles.is_empty() {
        let _ = writeln!(out, "    %% Circular dependencies");
        for (i, cycle) in result.cycles.iter().enumerate() {
            let _ = writeln!(out, "    %% {}. {}", i + 1, cycle.display_path());
        }
    }

    Ok(out)
}

/// Sanitized, unique Mermaid ids for every node, in node order.
fn assign_ids(graph: &DependencyGraph) -> HashMap<&str, String> {
    let mut used = HashSet::new();
    let mut ids = HashMap::with_capacity(graph.node_count());
    for node in graph.nodes() {
        let base = sanitize_id(&node.identity);
        let mut candidate = base.clone();
        let mut n = 2;
        while !used.insert(candidate.clone()) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        ids.insert(node.identity.as_str(), candidate);
    }
    ids
}

fn id_of<'a>(ids: &'a HashMap<&str, String>, identity: &str) -> &'a str {
    ids.get(identity).map(String::as_str).unwrap_or("node")
}

/// Mermaid ids are word characters only and start with a letter or `_`.
fn sanitize_id(identity: &str) -> String {
    let mut id = String::with_capacity(identity.len());
    for c in identity.chars() {
        let c = if c.is_alphanumeric() || c == '_' { c } else { '_' };
        if c == '_' && id.ends_with('_') {
            continue;
        }
        id.push(c);
    }
    let trimmed = id.trim_matches('_');
    if trimmed.is_empty() {
        return "node".to_string();
    }
    let mut id = if trimmed.starts_with(|c: char| c.is_alphabetic()) {
        trimmed.to_string()
    } else {
        format!("_{}", trimmed)
    };
    if let Some((cut, _)) = id.char_indices().nth(MAX_ID_LEN) {
        id.truncate(cut);
    }
    if RESERVED_IDS.iter().any(|word| word.eq_ignore_ascii_case(&id)) {
        id.push('_');
    }
    id
}

fn label(identity: &str) -> String {
    identity
        .replace('\\', "\\\\")
        .replace('"', "#quot;")
        .replace(['\n', '\r'], " ")
}
