//! Final text pass over assembled wikitext.
//!
//! Rewrites typographic glyphs to their ASCII spelling and canonicalizes
//! whitespace. Every step is idempotent, so running the pass twice changes nothing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// URL prefixes removed by default: archive snapshots, and the article-path
/// prefix of common wiki farms (so a pasted article URL becomes a page name).
pub const DEFAULT_URL_PREFIXES: &[&str] = &[
    r"https://web\.archive\.org/web/\d+[im_]*/",
    r"https://\w+\.fandom\.com/wiki/",
    r"https://\w+\.miraheze\.org/wiki/",
    r"https://\w+\.wikipedia\.org/wiki/",
];

static SPACES_BEFORE_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +\n").unwrap());
static BLANK_LINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n\s*\n").unwrap());
static NEWLINE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n+").unwrap());
static TRAILING_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m) +$").unwrap());

/// Canonicalize punctuation and whitespace.
pub fn normalize(text: &str) -> String {
    let text = translate_glyphs(text);
    let text = SPACES_BEFORE_NEWLINE.replace_all(&text, "\n");
    let text = BLANK_LINE_RUNS.replace_all(&text, "\n\n");
    let text = NEWLINE_RUNS.replace_all(&text, "\n\n");
    TRAILING_SPACES.replace_all(&text, "").into_owned()
}

fn translate_glyphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{2018}' | '\u{2019}' | '\u{00b4}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{2033}' => out.push('"'),
            '\u{2212}' | '\u{2022}' | '\u{00b7}' | '\u{25aa}' => out.push('-'),
            '\u{2013}' | '\u{2015}' => out.push_str("--"),
            '\u{2014}' => out.push_str("---"),
            '\u{2026}' => out.push_str("..."),
            '\u{00a0}' => out.push(' '),
            _ => out.push(ch),
        }
    }
    out
}

/// A compiled set of URL prefix patterns.
///
/// Serialized as the list of pattern strings. Patterns are compiled once, when the set
/// is built or deserialized, so an invalid pattern is a configuration error.
#[derive(Debug, Clone)]
pub struct UrlPrefixes(Vec<Regex>);

static DEFAULT_PREFIXES: Lazy<UrlPrefixes> =
    Lazy::new(|| UrlPrefixes::new(DEFAULT_URL_PREFIXES).unwrap());

impl UrlPrefixes {
    /// Compile `patterns`, failing on the first invalid one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// The source patterns, in order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(Regex::as_str)
    }

    /// Remove every match of every pattern from `text`.
    pub fn strip(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.0 {
            out = re.replace_all(&out, "").into_owned();
        }
        out
    }
}

impl Default for UrlPrefixes {
    fn default() -> Self {
        DEFAULT_PREFIXES.clone()
    }
}

impl PartialEq for UrlPrefixes {
    fn eq(&self, other: &Self) -> bool {
        self.patterns().eq(other.patterns())
    }
}

impl Eq for UrlPrefixes {}

impl Serialize for UrlPrefixes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.patterns())
    }
}

impl<'de> Deserialize<'de> for UrlPrefixes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let patterns = Vec::<String>::deserialize(deserializer)?;
        UrlPrefixes::new(patterns.as_slice()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_smart_punctuation() {
        assert_eq!(
            normalize("\u{201c}It\u{2019}s\u{201d} \u{2014} a\u{2013}b \u{2022} c\u{2026}"),
            "\"It's\" --- a--b - c..."
        );
        assert_eq!(normalize("x\u{00a0}y"), "x y");
    }

    #[test]
    fn em_dash_becomes_three_hyphens() {
        assert_eq!(normalize("a\u{2014}b"), "a---b");
    }

    #[test]
    fn strips_trailing_spaces() {
        assert_eq!(normalize("a   \nb  "), "a\nb");
        assert_eq!(normalize("a\u{00a0}\nb"), "a\nb");
    }

    #[test]
    fn collapses_blank_line_runs() {
        assert_eq!(normalize("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n  \n \n\nb"), "a\n\nb");
        assert_eq!(normalize("text\n\n\n\n\n"), "text\n\n");
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
    }

    #[test]
    fn keeps_indentation_after_blank_lines() {
        assert_eq!(normalize("a\n\n\n  code"), "a\n\n  code");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "plain",
            "  lead\n\t\n \n\t\ttabs  \n\n\n",
            "a \u{2014} b\u{00a0}\u{00a0}\n\n \n\u{2026}",
            "\n\n\n* A\n** B   \n\n\n\n{| class=\"wikitable\"\n|}\n",
            "x\t\n\n\ny \n \n",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn strips_wiki_farm_and_archive_prefixes() {
        let text = "[[https://en.wikipedia.org/wiki/Rust|Rust]] \
                    [https://web.archive.org/web/20200101000000im_/https://example.com x]";
        assert_eq!(
            UrlPrefixes::default().strip(text),
            "[[Rust|Rust]] [https://example.com x]"
        );
    }

    #[test]
    fn default_prefixes_match_the_pattern_list() {
        let defaults = UrlPrefixes::default();
        assert!(defaults.patterns().eq(DEFAULT_URL_PREFIXES.iter().copied()));
        assert_eq!(defaults, UrlPrefixes::new(DEFAULT_URL_PREFIXES).unwrap());
    }

    #[test]
    fn invalid_patterns_are_rejected_up_front() {
        assert!(UrlPrefixes::new(&["(", "foo"]).is_err());

        let custom = UrlPrefixes::new(&["foo"]).unwrap();
        assert_eq!(custom.strip("foobar"), "bar");
    }

    #[test]
    fn prefixes_serialize_as_pattern_strings() {
        let custom = UrlPrefixes::new(&[r"https://wiki\.example\.org/"]).unwrap();
        let json = serde_json::to_string(&custom).unwrap();
        assert_eq!(json, r#"["https://wiki\\.example\\.org/"]"#);

        let back: UrlPrefixes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, custom);
        assert!(serde_json::from_str::<UrlPrefixes>(r#"["("]"#).is_err());
    }
}
