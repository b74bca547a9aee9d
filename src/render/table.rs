//! Table family: `{| ... |}` wrappers and cell attribute suffixes.

use crate::dom::Node;

pub(crate) fn table(content: &str, node: &Node) -> String {
    let class = if node.class_contains("sortable") {
        "wikitable sortable"
    } else {
        "wikitable"
    };
    format!("\n{{| class=\"{class}\"\n{content}\n|}}\n")
}

/// `! attrs | content` for header cells, `| attrs | content` for data cells.
pub(crate) fn cell(content: &str, node: &Node) -> String {
    let mut attrs: Vec<String> = Vec::new();

    for name in ["colspan", "rowspan"] {
        let value = node.attr(name).trim();
        if !value.is_empty() && value != "1" {
            attrs.push(format!("{name}={value}"));
        }
    }

    if let Some(align) = text_align(node.attr("style")) {
        attrs.push(format!("align={align}"));
    }

    let marker = if node.is_element("th") { '!' } else { '|' };
    let mut out = String::new();
    out.push(marker);
    for a in &attrs {
        out.push(' ');
        out.push_str(a);
    }
    out.push_str(" | ");
    out.push_str(content.trim());
    out.push('\n');
    out
}

/// `text-align` keyword from an inline style, ignoring whitespace and case.
fn text_align(style: &str) -> Option<&'static str> {
    let compact: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    ["center", "right", "left"]
        .into_iter()
        .find(|align| compact.contains(&format!("text-align:{align}")))
}
