//! Markup -> `Node` tree, via `scraper` (html5ever).
//!
//! Malformed markup is the parser's concern: html5ever recovers the same way a
//! browser does, so the tree handed to the renderer is always well formed.

use scraper::{ElementRef, Html, Node as HtmlNode};

use crate::dom::{MAX_TREE_DEPTH, Node};

/// Elements whose content never reaches the tree.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "meta", "link", "title",
];

const START_FRAGMENT: &str = "<!--StartFragment-->";
const END_FRAGMENT: &str = "<!--EndFragment-->";

/// Parse a pasted markup fragment into a content tree.
///
/// The returned root is the parser's synthetic `html` element; it has no
/// conversion rule, so it passes its children's output through unchanged.
pub fn parse_fragment(html: &str) -> Node {
    let fragment = extract_clipboard_fragment(html);
    let document = Html::parse_fragment(fragment);
    element_to_node(document.root_element(), 0)
}

/// Returns the markup between the clipboard `StartFragment` / `EndFragment`
/// markers (CF_HTML payloads), or the whole input when there are none.
pub fn extract_clipboard_fragment(input: &str) -> &str {
    let Some(start) = input.find(START_FRAGMENT) else {
        return input;
    };
    let body = &input[start + START_FRAGMENT.len()..];
    match body.find(END_FRAGMENT) {
        Some(end) => &body[..end],
        None => body,
    }
}

fn element_to_node(element: ElementRef<'_>, depth: usize) -> Node {
    let value = element.value();
    let mut node = Node::element(value.name());
    for (name, v) in value.attrs() {
        node = node.with_attr(name, v);
    }

    if depth >= MAX_TREE_DEPTH {
        // clamp: keep the text, drop the structure below.
        let text: String = element.text().collect();
        if !text.is_empty() {
            node.push_child(Node::text(&text));
        }
        return node;
    }

    for child in element.children() {
        match child.value() {
            HtmlNode::Text(text) => node.push_child(Node::text(&text.text)),
            HtmlNode::Comment(comment) => {
                if !is_clipboard_marker(&comment.comment) {
                    node.push_child(Node::comment(&comment.comment));
                }
            }
            HtmlNode::Element(el) => {
                if SKIPPED_ELEMENTS
                    .iter()
                    .any(|s| el.name().eq_ignore_ascii_case(s))
                {
                    continue;
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    node.push_child(element_to_node(child_el, depth + 1));
                }
            }
            _ => {}
        }
    }

    node
}

fn is_clipboard_marker(comment: &str) -> bool {
    matches!(comment.trim(), "StartFragment" | "EndFragment")
}
