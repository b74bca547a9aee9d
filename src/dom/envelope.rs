use crate::dom::Node;
use serde::{Deserialize, Serialize};

/// Top-level JSON file written by `--json` and read by `--from-json`.
///
/// This wraps a content tree with metadata that makes debugging easier
/// (schema versioning, generator and source info).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeFile {
    /// Schema version for this JSON payload.
    pub schema_version: u32,

    pub generator: GeneratorInfo,

    pub source: SourceInfo,

    pub root: Node,
}

/// Identifies the program that produced the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub name: String,
    pub version: String,
}

/// Optional information about the markup the tree was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// If available, a path to the markup file used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Length of the input in bytes.
    pub byte_len: u64,
}
