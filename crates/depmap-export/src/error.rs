//! Export error types

use depmap_core::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown export format '{0}' (expected one of: json, dot, mermaid, markdown)")]
    UnknownFormat(String),

    #[error("edge endpoint {0:?} is missing from the graph")]
    MissingNode(NodeId),
}
