//! Content tree and JSON envelope.
//!
//! This module defines the **contract** between:
//! 1) parsing pasted markup -> `Node` tree, and
//! 2) rendering the tree -> wikitext.
//!
//! The tree is deliberately small: elements, text and comments. Nodes never
//! point back at their parent; the renderer carries ancestry down explicitly.

mod envelope;
mod nodes;
mod parse;

pub use envelope::*;
pub use nodes::*;
pub use parse::*;

/// JSON schema version for the tree envelope.
///
/// Bump this when making non-backwards-compatible changes to the JSON structure.
pub const SCHEMA_VERSION: u32 = 1;

/// The generator name stored in the JSON envelope.
pub const GENERATOR_NAME: &str = "clip2wiki";

/// The generator version stored in the JSON envelope.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum element depth kept by [`parse_fragment`].
///
/// Elements at this depth keep only their descendant text. The value
/// keeps a pretty-printed [`TreeFile`] under `serde_json`'s recursion limit
/// (each tree level costs two JSON levels: the node object and its children array).
pub const MAX_TREE_DEPTH: usize = 56;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treefile_json_round_trip() {
        let root = Node::element("div")
            .with_attr("class", "content")
            .with_child(
                Node::element("h2").with_child(Node::text("Title")),
            )
            .with_child(Node::comment("note"))
            .with_child(
                Node::element("p")
                    .with_child(Node::text("Hello "))
                    .with_child(Node::element("b").with_child(Node::text("world"))),
            );

        let file = TreeFile {
            schema_version: SCHEMA_VERSION,
            generator: GeneratorInfo {
                name: GENERATOR_NAME.to_string(),
                version: GENERATOR_VERSION.to_string(),
            },
            source: SourceInfo {
                path: Some("paste.html".to_string()),
                byte_len: 42,
            },
            root,
        };

        let json = serde_json::to_string_pretty(&file).expect("serialize");
        let back: TreeFile = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(file, back);
    }

    #[test]
    fn node_json_is_tagged_by_type() {
        let node = Node::element("a").with_attr("href", "/wiki/Home");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"type":"element","name":"a","attrs":[{"name":"href","value":"/wiki/Home"}]}"#
        );

        let text: Node = serde_json::from_str(r#"{"type":"text","value":"hi"}"#).unwrap();
        assert_eq!(text, Node::text("hi"));
    }
}
