use serde::{Deserialize, Serialize};

/// A node of the pasted content tree.
///
/// Each node exclusively owns its children. There is no parent pointer:
/// ancestry and sibling queries are answered by the renderer's `Context`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Element {
        /// Lower-case element name, e.g. `li`.
        name: String,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attrs: Vec<Attr>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<Node>,
    },

    /// Literal text, already entity-decoded by the parser.
    Text { value: String },

    /// A markup comment (`<!-- ... -->`), without its delimiters.
    Comment { value: String },
}

/// A single element attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Node {
    pub fn element(name: &str) -> Self {
        Node::Element {
            name: name.to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(value: &str) -> Self {
        Node::Text {
            value: value.to_string(),
        }
    }

    pub fn comment(value: &str) -> Self {
        Node::Comment {
            value: value.to_string(),
        }
    }

    /// Builder: adds an attribute (no-op for text and comment nodes).
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.push(Attr {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        self
    }

    /// Builder: appends a child (no-op for text and comment nodes).
    pub fn with_child(mut self, child: Node) -> Self {
        self.push_child(child);
        self
    }

    pub fn push_child(&mut self, child: Node) {
        if let Node::Element { children, .. } = self {
            children.push(child);
        }
    }

    /// Element name, or `None` for text and comment nodes.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// True if this is an element named `name` (case-insensitive).
    pub fn is_element(&self, name: &str) -> bool {
        self.tag().is_some_and(|t| t.eq_ignore_ascii_case(name))
    }

    /// True if this is an element whose name is one of `names`.
    pub fn is_any_element(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.is_element(n))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Node::Comment { .. })
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Attribute value by name (case-insensitive). Missing attributes read as `""`.
    pub fn attr(&self, name: &str) -> &str {
        match self {
            Node::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(name))
                .map(|a| a.value.as_str())
                .unwrap_or(""),
            _ => "",
        }
    }

    /// True if the raw `class` attribute value contains `needle` as a substring.
    pub fn class_contains(&self, needle: &str) -> bool {
        self.attr("class").contains(needle)
    }

    /// Text or comment payload; empty for elements.
    pub fn value(&self) -> &str {
        match self {
            Node::Text { value } | Node::Comment { value } => value,
            Node::Element { .. } => "",
        }
    }

    /// True if any descendant (not `self`) is an element named `name`.
    pub fn has_descendant(&self, name: &str) -> bool {
        self.children()
            .iter()
            .any(|c| c.is_element(name) || c.has_descendant(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_lookup_is_case_insensitive_and_defaults_to_empty() {
        let n = Node::element("IMG").with_attr("SRC", "a.png");
        assert_eq!(n.tag(), Some("img"));
        assert_eq!(n.attr("src"), "a.png");
        assert_eq!(n.attr("alt"), "");
        assert_eq!(Node::text("x").attr("src"), "");
    }

    #[test]
    fn has_descendant_skips_self() {
        let li = Node::element("li").with_child(Node::text("x"));
        assert!(!li.has_descendant("li"));

        let dt = Node::element("dt").with_child(
            Node::element("ul").with_child(Node::element("li").with_child(Node::text("x"))),
        );
        assert!(dt.has_descendant("li"));
    }
}
