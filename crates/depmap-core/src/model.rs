//! Core data structures for the dependency graph

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Stable identifier for a node: its insertion index in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

/// One parsed source file as handed over by the parsing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FileSummary {
    /// Canonical path, unique within a run. Missing in the input means empty.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub language: String,
    /// Raw reference strings in source order. Duplicates are kept.
    #[serde(default, alias = "imports")]
    pub references: Vec<String>,
    /// Number of classes the parser found, if it counted them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<u32>,
}

impl FileSummary {
    pub fn new(path: impl Into<String>, language: impl Into<String>) -> Self {
        FileSummary {
            path: path.into(),
            language: language.into(),
            references: Vec::new(),
            classes: None,
        }
    }

    /// Builder-style helper used by callers assembling summaries by hand.
    pub fn with_references<I, S>(mut self, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.references = references.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_classes(mut self, classes: u32) -> Self {
        self.classes = Some(classes);
        self
    }
}

/// Source languages the resolver knows how to map references for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Java,
    Kotlin,
    CSharp,
    Rust,
    Go,
    Php,
    Other,
}

impl Language {
    /// Recognise a language tag, falling back to the path's extension.
    pub fn detect(tag: &str, path: &str) -> Self {
        match Self::from_tag(tag) {
            Language::Other => Self::from_path(Path::new(path)),
            lang => lang,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "typescript" | "ts" | "tsx" => Language::TypeScript,
            "javascript" | "js" | "jsx" | "node" => Language::JavaScript,
            "python" | "py" => Language::Python,
            "java" => Language::Java,
            "kotlin" | "kt" => Language::Kotlin,
            "csharp" | "c#" | "cs" => Language::CSharp,
            "rust" | "rs" => Language::Rust,
            "go" | "golang" => Language::Go,
            "php" => Language::Php,
            _ => Language::Other,
        }
    }

    /// Detect language from file extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("ts") | Some("tsx") | Some("mts") | Some("cts") => Language::TypeScript,
            Some("js") | Some("jsx") | Some("mjs") | Some("cjs") => Language::JavaScript,
            Some("py") | Some("pyi") => Language::Python,
            Some("java") => Language::Java,
            Some("kt") | Some("kts") => Language::Kotlin,
            Some("cs") => Language::CSharp,
            Some("rs") => Language::Rust,
            Some("go") => Language::Go,
            Some("php") => Language::Php,
            _ => Language::Other,
        }
    }

    /// Extensions tried, in order, when a reference names a file without one.
    pub fn candidate_extensions(self) -> &'static [&'static str] {
        match self {
            Language::TypeScript | Language::JavaScript => {
                &["ts", "tsx", "js", "jsx", "mjs", "cjs", "d.ts"]
            }
            Language::Python => &["py", "pyi"],
            Language::Java => &["java"],
            Language::Kotlin => &["kt", "java"],
            Language::CSharp => &["cs"],
            Language::Rust => &["rs"],
            Language::Go => &["go"],
            Language::Php => &["php"],
            Language::Other => &[],
        }
    }

    /// File stems that stand for their parent directory.
    pub fn index_stems(self) -> &'static [&'static str] {
        match self {
            Language::TypeScript | Language::JavaScript => &["index"],
            Language::Python => &["__init__"],
            Language::Rust => &["mod"],
            _ => &[],
        }
    }

    /// Whether a bare, non-relative reference may name a scanned file by
    /// path suffix. Bare JS/TS specifiers always name packages.
    pub fn resolves_bare_by_suffix(self) -> bool {
        !matches!(self, Language::TypeScript | Language::JavaScript)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::CSharp => "csharp",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Php => "php",
            Language::Other => "other",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a node was scanned or only referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOrigin {
    Internal,
    External,
}

/// A single file or module in the dependency graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub identity: String,
    /// Language tag as supplied by the caller. `None` for external nodes.
    pub language: Option<String>,
    pub origin: NodeOrigin,
}

impl Node {
    pub fn is_internal(&self) -> bool {
        self.origin == NodeOrigin::Internal
    }

    pub fn is_external(&self) -> bool {
        self.origin == NodeOrigin::External
    }
}

/// A logical dependency between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    /// Every raw reference that produced this edge, in encounter order.
    pub provenance: Vec<String>,
}

impl Edge {
    pub fn is_self_edge(&self) -> bool {
        self.source == self.target
    }
}

/// A summary the builder refused, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Position of the summary in the caller's sequence.
    pub index: usize,
    pub path: String,
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "summary #{}: {}", self.index, self.reason)
        } else {
            write!(f, "summary #{} ({}): {}", self.index, self.path, self.reason)
        }
    }
}

/// An elementary cycle in canonical rotation: it starts at its
/// lexicographically smallest identity and keeps the traversal direction.
/// The closing repetition of the first node is implicit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cycle(Vec<String>);

impl Cycle {
    /// Rotate `path` into canonical form. Returns `None` for an empty path.
    pub fn canonical(path: Vec<String>) -> Option<Self> {
        let start = path
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(i, _)| i)?;
        let mut nodes = path;
        nodes.rotate_left(start);
        Some(Cycle(nodes))
    }

    pub fn nodes(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `A -> B -> C -> A`
    pub fn display_path(&self) -> String {
        let mut parts: Vec<&str> = self.0.iter().map(String::as_str).collect();
        if let Some(first) = self.0.first() {
            parts.push(first);
        }
        parts.join(" -> ")
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_path())
    }
}
