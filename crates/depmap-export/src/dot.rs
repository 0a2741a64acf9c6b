//! Graphviz DOT output

use std::fmt::Write;

use depmap_core::AnalysisResult;

use crate::error::ExportError;
use crate::{TRUNCATION_NOTICE, resolved_edges};

pub(crate) fn render(result: &AnalysisResult) -> Result<String, ExportError> {
    let edges = resolved_edges(result)?;
    let graph = &result.graph;

    let mut out = String::with_capacity(64 * (graph.node_count() + edges.len()) + 64);
    let _ = writeln!(out, "digraph dependencies {{");
    if result.partial {
        let _ = writeln!(out, "  // {}", TRUNCATION_NOTICE);
    }
    let _ = writeln!(out, "  rankdir=LR;");
    let _ = writeln!(out, "  node [shape=box, fontname=\"monospace\"];");

    if !graph.is_empty() {
        let _ = writeln!(out);
    }
    for node in graph.nodes() {
        if node.is_external() {
            let _ = writeln!(out, "  \"{}\" [style=dashed];", quote(&node.identity));
        } else {
            let _ = writeln!(out, "  \"{}\";", quote(&node.identity));
        }
    }

    if !edges.is_empty() {
        let _ = writeln!(out);
    }
    for (source, target, _) in &edges {
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\";",
            quote(&source.identity),
            quote(&target.identity)
        );
    }

    let _ = writeln!(out, "}}");
    Ok(out)
}

fn quote(identity: &str) -> String {
    identity.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    #[test]
    fn test_sample_graph() {
        let text = render(&sample()).unwrap();
        insta::assert_snapshot!(text, @r###"
        digraph dependencies {
          rankdir=LR;
          node [shape=box, fontname="monospace"];

          "a.js";
          "b.js";
          "c.js";
          "lonely.js";
          "left-pad" [style=dashed];

          "a.js" -> "b.js";
          "a.js" -> "left-pad";
          "b.js" -> "c.js";
          "c.js" -> "a.js";
        }
        "###);
    }

    #[test]
    fn test_empty_graph_is_well_formed() {
        let text = render(&analyzed(&[])).unwrap();
        insta::assert_snapshot!(text, @r###"
        digraph dependencies {
          rankdir=LR;
          node [shape=box, fontname="monospace"];
        }
        "###);
    }

    #[test]
    fn test_quotes_are_escaped() {
        let text = render(&analyzed(&[summary("we\"ird", &[])])).unwrap();
        assert!(text.contains(r#""we\"ird";"#));
    }

    #[test]
    fn test_partial_result_carries_comment() {
        let text = render(&truncated()).unwrap();
        assert!(text.lines().nth(1).unwrap().contains(TRUNCATION_NOTICE));
    }
}
