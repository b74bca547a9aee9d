//! The conversion rule registry.
//!
//! Rules are tried in [`RULES`] order and the first match wins. Predicate rules
//! sit ahead of the tag rules they refine (inline code before `pre`, bulleted
//! `dd` before plain `dd`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dom::Node;
use crate::render::{Context, Converted, links, table};

/// Rewrites a node's converted children into the node's output.
pub type Replacement = fn(&Converted, &Node, &Context<'_>) -> String;

/// Decides whether a rule applies to a node.
#[derive(Clone, Copy)]
pub enum Matcher {
    /// Element name is one of the listed tags.
    Tags(&'static [&'static str]),

    /// Arbitrary test over the node and its context.
    Predicate(fn(&Node, &Context<'_>) -> bool),
}

impl Matcher {
    pub fn matches(&self, node: &Node, ctx: &Context<'_>) -> bool {
        match self {
            Matcher::Tags(tags) => node.is_any_element(tags),
            Matcher::Predicate(test) => test(node, ctx),
        }
    }
}

pub struct Rule {
    /// Stable name, for logs and tests.
    pub name: &'static str,
    pub matcher: Matcher,
    pub replace: Replacement,
}

const CODE_TAGS: &[&str] = &["code", "kbd", "samp", "tt"];

pub static RULES: &[Rule] = &[
    Rule {
        name: "heading",
        matcher: Matcher::Tags(&["h1", "h2", "h3", "h4", "h5", "h6"]),
        replace: heading,
    },
    Rule {
        name: "sup",
        matcher: Matcher::Tags(&["sup"]),
        replace: html_wrap,
    },
    Rule {
        name: "sub",
        matcher: Matcher::Tags(&["sub"]),
        replace: html_wrap,
    },
    Rule {
        name: "line_break",
        matcher: Matcher::Tags(&["br"]),
        replace: |_, _, _| "<br />".to_string(),
    },
    Rule {
        name: "horizontal_rule",
        matcher: Matcher::Tags(&["hr"]),
        replace: |_, _, _| "\n\n----\n\n".to_string(),
    },
    Rule {
        name: "emphasis",
        matcher: Matcher::Tags(&["em", "i", "cite", "var"]),
        replace: |c, _, _| quote_wrap(&c.text, "''"),
    },
    Rule {
        name: "strong",
        matcher: Matcher::Tags(&["strong", "b"]),
        replace: |c, _, _| quote_wrap(&c.text, "'''"),
    },
    Rule {
        name: "inserted",
        matcher: Matcher::Tags(&["ins", "u"]),
        replace: |c, _, _| format!("<ins>{}</ins>", c.text),
    },
    Rule {
        name: "deleted",
        matcher: Matcher::Tags(&["del", "s", "strike"]),
        replace: |c, _, _| format!("<del>{}</del>", c.text),
    },
    Rule {
        name: "inline_code",
        matcher: Matcher::Predicate(is_inline_code),
        replace: |c, _, _| format!("<code>{}</code>", c.text),
    },
    Rule {
        name: "link",
        matcher: Matcher::Predicate(is_link),
        replace: |c, node, _| links::wiki_link(node.attr("href"), &c.text),
    },
    Rule {
        name: "image",
        matcher: Matcher::Tags(&["img"]),
        replace: |_, node, _| links::file_link(node),
    },
    Rule {
        name: "list_item",
        matcher: Matcher::Tags(&["li"]),
        replace: list_item,
    },
    Rule {
        name: "list",
        matcher: Matcher::Tags(&["ul", "ol"]),
        replace: list,
    },
    Rule {
        name: "blockquote",
        matcher: Matcher::Tags(&["blockquote"]),
        replace: blockquote,
    },
    Rule {
        name: "bulleted_definition",
        matcher: Matcher::Predicate(is_bulleted_definition),
        replace: |c, _, _| format!(":* {}\n", c.text.trim()),
    },
    Rule {
        name: "definition_list",
        matcher: Matcher::Tags(&["dl"]),
        replace: |c, _, _| format!("\n{}", c.text),
    },
    Rule {
        name: "definition_term",
        matcher: Matcher::Tags(&["dt"]),
        replace: |c, _, _| format!("; {}\n", c.text.trim()),
    },
    Rule {
        name: "definition",
        matcher: Matcher::Tags(&["dd"]),
        replace: |c, _, _| format!(": {}\n", c.text.trim()),
    },
    Rule {
        name: "table",
        matcher: Matcher::Tags(&["table"]),
        replace: |c, node, _| table::table(&c.text, node),
    },
    Rule {
        name: "table_caption",
        matcher: Matcher::Tags(&["caption"]),
        replace: |c, _, _| format!("|+ {}\n", c.text.trim()),
    },
    Rule {
        name: "table_row",
        matcher: Matcher::Tags(&["tr"]),
        replace: |c, _, _| format!("|-\n{}", c.text),
    },
    Rule {
        name: "table_cell",
        matcher: Matcher::Tags(&["th", "td"]),
        replace: |c, node, _| table::cell(&c.text, node),
    },
    Rule {
        name: "preformatted",
        matcher: Matcher::Tags(&["pre"]),
        replace: preformatted,
    },
    Rule {
        name: "inline_quote",
        matcher: Matcher::Tags(&["q"]),
        replace: html_wrap,
    },
    Rule {
        name: "comment",
        matcher: Matcher::Predicate(|node, _| node.is_comment()),
        replace: |_, node, _| format!("<!-- {} -->", node.value()),
    },
    Rule {
        name: "paragraph",
        matcher: Matcher::Tags(&["p"]),
        replace: paragraph,
    },
];

/// First rule matching `node`, if any.
pub fn lookup(node: &Node, ctx: &Context<'_>) -> Option<&'static Rule> {
    RULES.iter().find(|r| r.matcher.matches(node, ctx))
}

fn is_inline_code(node: &Node, ctx: &Context<'_>) -> bool {
    // a lone code element inside <pre> is the code block's body; <pre> wraps it.
    let code_block_body = ctx.parent().is_some_and(|p| p.is_element("pre")) && !ctx.has_siblings();
    node.is_any_element(CODE_TAGS) && !code_block_body
}

fn is_link(node: &Node, _ctx: &Context<'_>) -> bool {
    node.is_element("a") && !node.attr("href").is_empty()
}

fn is_bulleted_definition(node: &Node, ctx: &Context<'_>) -> bool {
    node.is_element("dd")
        && ctx.parent().is_some_and(|p| p.is_element("dl"))
        && ctx
            .prev_sibling()
            .is_some_and(|s| s.is_element("dt") && s.has_descendant("li"))
}

fn heading(c: &Converted, node: &Node, _ctx: &Context<'_>) -> String {
    let level = node
        .tag()
        .and_then(|t| t.get(1..))
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, 6);
    let marks = "=".repeat(level);
    format!("\n{marks} {} {marks}\n", c.text.trim())
}

fn html_wrap(c: &Converted, node: &Node, _ctx: &Context<'_>) -> String {
    let tag = node.tag().unwrap_or_default();
    format!("<{tag}>{}</{tag}>", c.text)
}

fn quote_wrap(content: &str, quotes: &str) -> String {
    // a bare '''' would open bold in wikitext.
    if content.trim().is_empty() {
        return content.to_string();
    }
    format!("{quotes}{content}{quotes}")
}

/// One run of an item's children, laid out on its own lines.
enum ItemPart<'a> {
    /// Inline content; the first line carries the bullet.
    Text(String),

    /// A nested `ul`/`ol`, whose lines already carry their full markers.
    List(&'a str),

    /// A nested `dl`, whose `;`/`:` lines continue this item's markers.
    Definitions(&'a str),

    /// A `pre` or table (or a container holding one); its lines are kept verbatim.
    Block(&'a str),
}

fn list_item(c: &Converted, node: &Node, ctx: &Context<'_>) -> String {
    let markers = ctx.list_markers();

    let mut parts: Vec<ItemPart<'_>> = Vec::new();
    for (child, out) in node.children().iter().zip(&c.children) {
        if child.is_any_element(&["ul", "ol"]) {
            parts.push(ItemPart::List(out));
        } else if child.is_element("dl") {
            parts.push(ItemPart::Definitions(out));
        } else if is_block(child) {
            parts.push(ItemPart::Block(out));
        } else if let Some(ItemPart::Text(text)) = parts.last_mut() {
            text.push_str(out);
        } else {
            parts.push(ItemPart::Text(out.clone()));
        }
    }

    let mut lines: Vec<String> = Vec::new();
    let mut bulleted = false;
    for part in &parts {
        match part {
            ItemPart::Text(text) => {
                for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    lines.push(item_line(markers, line, bulleted));
                    bulleted = true;
                }
            }
            ItemPart::List(out) => {
                lines.extend(non_blank_lines(out).map(str::to_string));
            }
            ItemPart::Definitions(out) => {
                lines.extend(non_blank_lines(out).map(|l| format!("{markers}{}", l.trim())));
            }
            ItemPart::Block(out) => {
                let block = out.trim_matches('\n');
                if block.trim().is_empty() {
                    continue;
                }
                if !bulleted && !markers.is_empty() {
                    lines.push(markers.to_string());
                    bulleted = true;
                }
                lines.extend(block.split('\n').map(str::to_string));
            }
        }
    }
    lines.join("\n")
}

/// First text line gets `* text`, later ones `*: text`; orphan items get no marker.
fn item_line(markers: &str, line: &str, bulleted: bool) -> String {
    match (markers.is_empty(), bulleted) {
        (true, _) => line.to_string(),
        (false, false) => format!("{markers} {line}"),
        (false, true) => format!("{markers}: {line}"),
    }
}

fn non_blank_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|l| !l.trim().is_empty())
}

/// Elements whose output must not be re-indented inside a list item.
fn is_block(node: &Node) -> bool {
    const BLOCKS: &[&str] = &["pre", "table"];
    node.is_any_element(BLOCKS)
        || (node.tag().is_some() && BLOCKS.iter().any(|b| node.has_descendant(b)))
}

fn list(c: &Converted, _node: &Node, ctx: &Context<'_>) -> String {
    let items: Vec<&str> = c
        .children
        .iter()
        .map(|s| s.trim_matches('\n'))
        .filter(|s| !s.trim().is_empty())
        .collect();
    if items.is_empty() {
        return String::new();
    }

    let body = items.join("\n");
    let nested = ctx
        .parent()
        .is_some_and(|p| p.is_any_element(&["li", "ul", "ol", "dt", "dd"]));
    if nested {
        format!("\n{body}")
    } else {
        format!("\n\n{body}\n\n")
    }
}

static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn blockquote(c: &Converted, _node: &Node, _ctx: &Context<'_>) -> String {
    let content = c.text.trim();
    let content = NEWLINE_RUNS.replace_all(content, "\n");
    let quoted: Vec<String> = content.split('\n').map(|l| format!("> {l}")).collect();
    format!("\n\n{}\n\n", quoted.join("\n"))
}

fn preformatted(c: &Converted, node: &Node, ctx: &Context<'_>) -> String {
    let body = c.text.trim_end_matches('\n');
    let first_code = node.children().first().filter(|n| n.is_element("code"));
    let is_code =
        first_code.is_some() || node.class_contains("code") || node.class_contains("source");

    if !is_code {
        return format!("<pre>\n{body}\n</pre>\n");
    }

    let lang = if ctx.options.detect_code_language {
        code_language(node).or_else(|| first_code.and_then(code_language))
    } else {
        None
    };
    match lang {
        Some(lang) => format!("<syntaxhighlight lang=\"{lang}\">\n{body}\n</syntaxhighlight>\n"),
        None => format!("<syntaxhighlight>\n{body}\n</syntaxhighlight>\n"),
    }
}

/// `rust` from `class="language-rust"` or `class="lang-rust"`.
fn code_language(node: &Node) -> Option<&str> {
    node.attr("class")
        .split_whitespace()
        .filter_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
        .find(|l| {
            !l.is_empty()
                && l
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '+' | '#'))
        })
}

fn paragraph(c: &Converted, _node: &Node, _ctx: &Context<'_>) -> String {
    let content = c.text.trim();
    if content.is_empty() {
        return String::new();
    }
    format!("\n\n{content}\n\n")
}
