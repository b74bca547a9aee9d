//! Link and media classification.
//!
//! Decides between wiki-internal (`[[...]]`) and external (`[...]`) link syntax
//! and builds `[[File:...]]` embeds for images.

use crate::dom::Node;

const ABSOLUTE_PREFIXES: &[&str] = &["http:", "https:", "www.", "ftp:"];

/// True if `href` should become a `[[...]]` link.
///
/// Heuristic: anything that is not an absolute URL, anything mentioning `wiki`,
/// and anything rooted at `/`.
pub fn is_internal(href: &str) -> bool {
    !has_absolute_prefix(href) || href.contains("wiki") || href.starts_with('/')
}

fn has_absolute_prefix(href: &str) -> bool {
    ABSOLUTE_PREFIXES.iter().any(|p| {
        href.get(..p.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(p))
    })
}

/// Build wikitext for an anchor with target `href` and converted content `content`.
pub fn wiki_link(href: &str, content: &str) -> String {
    let label = content.trim();
    let internal = is_internal(href);

    // a label that only repeats the target adds nothing.
    let redundant = label.is_empty() || label == href || (internal && label == page_title(href));

    match (internal, redundant) {
        (true, true) => format!("[[{href}]]"),
        (true, false) => format!("[[{href}|{label}]]"),
        (false, true) => format!("[{href}]"),
        (false, false) => format!("[{href} {label}]"),
    }
}

/// Page title implied by a link target: its last path segment, `_` read as a space.
///
/// `/wiki/Main_Page#History` -> `Main Page`.
pub fn page_title(href: &str) -> String {
    let path = href.split(['#', '?']).next().unwrap_or_default();
    let last = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    last.replace('_', " ")
}

/// Build a `[[File:...]]` embed from an `<img>` element.
///
/// Parameters are emitted in a fixed order (`alt`, `title`, `width`, `height`),
/// skipping empty ones. Without a `src` there is nothing to embed.
pub fn file_link(img: &Node) -> String {
    let src = img.attr("src");
    if src.is_empty() {
        return String::new();
    }

    let mut out = format!("[[File:{src}");
    for name in ["alt", "title", "width", "height"] {
        let value = img.attr(name);
        if !value.is_empty() {
            out.push('|');
            out.push_str(name);
            out.push('=');
            out.push_str(value);
        }
    }
    out.push_str("]]");
    out
}
