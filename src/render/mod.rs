//! Tree -> wikitext renderer.
//!
//! This module operates **only** on the content tree and never looks at raw
//! markup. Conversion is a post-order walk: every node's children are converted
//! first, then the node's rule (see [`rules`]) rewrites the joined child output.
//! Nodes without a rule pass their children's output through unchanged.

pub mod links;
pub mod rules;
mod table;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::dom::Node;
use crate::normalize::{self, UrlPrefixes};

pub use rules::{Matcher, RULES, Replacement, Rule, lookup};

/// Containers whose whitespace-only text children are dropped.
const STRUCTURAL_ELEMENTS: &[&str] = &["ul", "ol", "dl", "table", "thead", "tbody", "tfoot", "tr"];

/// Runs of markup whitespace (not NBSP), collapsed to one space outside `<pre>`.
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\n\r\x0C]+").unwrap());

/// Options that control conversion decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertOptions {
    /// If true, remove the `url_prefixes` patterns from the output (e.g. turn a pasted
    /// Wikipedia URL into a bare page name).
    pub strip_url_prefixes: bool,

    /// Patterns removed when `strip_url_prefixes` is set.
    pub url_prefixes: UrlPrefixes,

    /// If true, items under an `<ol>` get `#` markers instead of `*`.
    pub numbered_lists: bool,

    /// If true, a `language-X` / `lang-X` class on a code block becomes
    /// `<syntaxhighlight lang="X">`.
    pub detect_code_language: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            strip_url_prefixes: true,
            url_prefixes: UrlPrefixes::default(),
            numbered_lists: false,
            detect_code_language: true,
        }
    }
}

/// Ancestry and options visible to a rule while one node is converted.
///
/// Built top-down by the flattener, so rules never walk back up the tree.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    parent: Option<&'a Node>,
    index: usize,
    list_markers: &'a str,
    preformatted: bool,
    pub options: &'a ConvertOptions,
}

impl<'a> Context<'a> {
    /// Context for the tree root: no parent, no enclosing lists.
    pub fn root(options: &'a ConvertOptions) -> Self {
        Self {
            parent: None,
            index: 0,
            list_markers: "",
            preformatted: false,
            options,
        }
    }

    pub fn parent(&self) -> Option<&'a Node> {
        self.parent
    }

    /// One marker character (`*` or `#`) per enclosing `ul`/`ol`, outermost first.
    pub fn list_markers(&self) -> &'a str {
        self.list_markers
    }

    /// True inside a `<pre>`, where text keeps its whitespace.
    pub fn in_preformatted(&self) -> bool {
        self.preformatted
    }

    /// True if the node shares its parent with any other node.
    pub fn has_siblings(&self) -> bool {
        self.parent.is_some_and(|p| p.children().len() > 1)
    }

    /// The nearest preceding sibling, skipping whitespace-only text.
    pub fn prev_sibling(&self) -> Option<&'a Node> {
        let parent = self.parent?;
        parent.children()[..self.index]
            .iter()
            .rev()
            .find(|n| !is_blank_text(n))
    }
}

/// A node's converted children, handed to its rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Converted {
    /// Concatenation of `children`, in document order.
    pub text: String,

    /// Each child's output, so containers can work item by item.
    pub children: Vec<String>,
}

/// Convert a whole tree to normalized wikitext.
///
/// Total and deterministic: unknown nodes pass through, missing attributes read as empty.
pub fn convert(root: &Node, options: &ConvertOptions) -> String {
    let raw = convert_node(root, &Context::root(options));

    let stripped = if options.strip_url_prefixes {
        options.url_prefixes.strip(&raw)
    } else {
        raw
    };

    let out = normalize::normalize(&stripped);

    // outer blank lines only add noise when the text is inserted into an editor.
    let out = out.trim_matches('\n').to_string();
    debug!(bytes = out.len(), "converted tree to wikitext");
    out
}

/// Convert a single node (and its subtree) without normalization.
pub fn convert_node(node: &Node, ctx: &Context<'_>) -> String {
    if let Node::Text { value } = node {
        let structural = ctx
            .parent()
            .is_some_and(|p| p.is_any_element(STRUCTURAL_ELEMENTS));
        if structural && value.trim().is_empty() {
            return String::new();
        }
        if ctx.in_preformatted() {
            return value.clone();
        }
        return WHITESPACE_RUNS.replace_all(value, " ").into_owned();
    }

    let converted = convert_children(node, ctx);
    match lookup(node, ctx) {
        Some(rule) => (rule.replace)(&converted, node, ctx),
        None => {
            if let Some(tag) = node.tag() {
                trace!(tag, "no rule matched; passing children through");
            }
            converted.text
        }
    }
}

fn convert_children(node: &Node, ctx: &Context<'_>) -> Converted {
    let extended: String;
    let list_markers: &str = if node.is_any_element(&["ul", "ol"]) {
        let marker = if ctx.options.numbered_lists && node.is_element("ol") {
            '#'
        } else {
            '*'
        };
        extended = format!("{}{}", ctx.list_markers, marker);
        &extended
    } else {
        ctx.list_markers
    };

    let preformatted = ctx.preformatted || node.is_element("pre");

    let mut children: Vec<String> = Vec::with_capacity(node.children().len());
    for (index, child) in node.children().iter().enumerate() {
        let child_ctx = Context {
            parent: Some(node),
            index,
            list_markers,
            preformatted,
            options: ctx.options,
        };
        let mut out = convert_node(child, &child_ctx);

        // text after a block starts a line; a leading space there would indent it.
        let after_block = children.last().is_some_and(|prev| prev.ends_with('\n'));
        if child.is_text() && !preformatted && after_block {
            out = out.trim_start().to_string();
        }
        children.push(out);
    }

    Converted {
        text: children.concat(),
        children,
    }
}

fn is_blank_text(node: &Node) -> bool {
    node.is_text() && node.value().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(name: &str, children: Vec<Node>) -> Node {
        children
            .into_iter()
            .fold(Node::element(name), |n, c| n.with_child(c))
    }

    fn text(s: &str) -> Node {
        Node::text(s)
    }

    fn render(node: &Node) -> String {
        let opts = ConvertOptions::default();
        convert_node(node, &Context::root(&opts))
    }

    #[test]
    fn unmatched_elements_pass_children_through() {
        let div = el(
            "div",
            vec![
                text("a "),
                el("span", vec![text("b")]),
                el("b", vec![text("c")]),
            ],
        );
        let opts = ConvertOptions::default();
        let ctx = Context::root(&opts);
        let children: String = div
            .children()
            .iter()
            .enumerate()
            .map(|(index, c)| {
                convert_node(
                    c,
                    &Context {
                        parent: Some(&div),
                        index,
                        list_markers: "",
                        preformatted: false,
                        options: &opts,
                    },
                )
            })
            .collect();
        assert_eq!(convert_node(&div, &ctx), children);
        assert_eq!(children, "a b'''c'''");
    }

    #[test]
    fn heading_level_three() {
        let h3 = el("h3", vec![text("Intro")]);
        assert_eq!(render(&h3), "\n=== Intro ===\n");
    }

    #[test]
    fn nested_list_markers_follow_depth() {
        let list = el(
            "ul",
            vec![el(
                "li",
                vec![text("A"), el("ul", vec![el("li", vec![text("B")])])],
            )],
        );
        let out = convert(&list, &ConvertOptions::default());
        assert_eq!(out, "* A\n** B");
    }

    #[test]
    fn numbered_lists_option_uses_hash_for_ol() {
        let list = el(
            "ol",
            vec![
                el("li", vec![text("one")]),
                el("li", vec![text("two"), el("ul", vec![el("li", vec![text("x")])])]),
            ],
        );
        let opts = ConvertOptions {
            numbered_lists: true,
            ..ConvertOptions::default()
        };
        assert_eq!(convert(&list, &opts), "# one\n# two\n#* x");
        assert_eq!(
            convert(&list, &ConvertOptions::default()),
            "* one\n* two\n** x"
        );
    }

    #[test]
    fn whitespace_text_in_structural_containers_is_dropped() {
        let list = el(
            "ul",
            vec![
                text("\n  "),
                el("li", vec![text("A")]),
                text("\n  "),
                el("li", vec![text("B")]),
                text("\n"),
            ],
        );
        assert_eq!(render(&list), "\n\n* A\n* B\n\n");
    }

    #[test]
    fn sortable_table_layout() {
        let table = el(
            "table",
            vec![el(
                "tbody",
                vec![
                    el("tr", vec![el("th", vec![text("Name")])]),
                    el("tr", vec![el("td", vec![text("Alice")])]),
                ],
            )],
        )
        .with_attr("class", "sortable wikitable");
        assert_eq!(
            convert(&table, &ConvertOptions::default()),
            "{| class=\"wikitable sortable\"\n|-\n! | Name\n|-\n| | Alice\n\n|}"
        );
    }

    #[test]
    fn definition_list_plain_and_bulleted() {
        let plain = el(
            "dl",
            vec![el("dt", vec![text("Term")]), el("dd", vec![text("Meaning")])],
        );
        assert_eq!(render(&plain), "\n; Term\n: Meaning\n");

        let bulleted = el(
            "dl",
            vec![
                el(
                    "dt",
                    vec![text("Term"), el("ul", vec![el("li", vec![text("x")])])],
                ),
                text("\n"),
                el("dd", vec![text("Meaning")]),
            ],
        );
        let out = render(&bulleted);
        assert!(out.contains("\n:* Meaning\n"), "{out}");
    }

    #[test]
    fn context_reports_siblings() {
        let opts = ConvertOptions::default();
        let parent = el("dl", vec![el("dt", vec![]), text(" \n"), el("dd", vec![])]);
        let ctx = Context {
            parent: Some(&parent),
            index: 2,
            list_markers: "",
            preformatted: false,
            options: &opts,
        };
        assert!(ctx.has_siblings());
        assert!(ctx.prev_sibling().is_some_and(|n| n.is_element("dt")));
        assert_eq!(Context::root(&opts).prev_sibling(), None);
        assert!(!ctx.in_preformatted());
    }

    #[test]
    fn convert_trims_outer_blank_lines_and_normalizes() {
        let doc = el(
            "div",
            vec![el("p", vec![text("It\u{2019}s \u{2014} done")]), text("\n\n\n\n")],
        );
        assert_eq!(convert(&doc, &ConvertOptions::default()), "It's --- done");
    }

    #[test]
    fn source_indentation_collapses_outside_pre() {
        let doc = el(
            "div",
            vec![
                text("\n  "),
                el(
                    "p",
                    vec![text("See\n      "), el("b", vec![text("this")]), text(" text")],
                ),
                text("\n"),
            ],
        );
        assert_eq!(
            convert(&doc, &ConvertOptions::default()),
            "See '''this''' text"
        );
    }

    #[test]
    fn text_after_a_block_does_not_start_indented() {
        let doc = el(
            "div",
            vec![el("h2", vec![text("Title")]), text("\n   tail")],
        );
        assert_eq!(convert(&doc, &ConvertOptions::default()), "== Title ==\ntail");
    }

    #[test]
    fn pre_text_keeps_its_whitespace() {
        let pre = el(
            "pre",
            vec![el("code", vec![text("if x:\n    y  =  1\n")])],
        );
        assert_eq!(
            convert(&pre, &ConvertOptions::default()),
            "<syntaxhighlight>\nif x:\n    y  =  1\n</syntaxhighlight>"
        );
    }
}
