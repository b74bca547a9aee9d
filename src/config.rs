//! YAML configuration for conversion options.
//!
//! Every field is optional; missing fields take their defaults:
//!
//! ```yaml
//! strip_url_prefixes: true
//! url_prefixes:
//!   - 'https://\w+\.fandom\.com/wiki/'
//! numbered_lists: false
//! detect_code_language: true
//! ```

use std::error::Error;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::render::ConvertOptions;

/// Read conversion options from a YAML file.
pub fn load_options(path: &Path) -> Result<ConvertOptions, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
    let opts = parse_options(&text)?;
    debug!(path = %path.display(), "loaded conversion options");
    Ok(opts)
}

/// Parse conversion options from YAML text.
///
/// Unknown keys are rejected, and every URL prefix pattern must compile; the
/// compiled patterns are kept on the returned options.
pub fn parse_options(text: &str) -> Result<ConvertOptions, Box<dyn Error>> {
    // an empty (or comment-only) document means "all defaults".
    let is_blank = text
        .lines()
        .all(|l| l.trim().is_empty() || l.trim_start().starts_with('#'));
    if is_blank {
        return Ok(ConvertOptions::default());
    }

    Ok(serde_yaml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_config_is_default() {
        assert_eq!(parse_options("").unwrap(), ConvertOptions::default());
        assert_eq!(
            parse_options("# nothing here\n\n").unwrap(),
            ConvertOptions::default()
        );
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let opts = parse_options("numbered_lists: true\n").unwrap();
        assert!(opts.numbered_lists);
        assert!(opts.strip_url_prefixes);
        assert_eq!(opts.url_prefixes, ConvertOptions::default().url_prefixes);
    }

    #[test]
    fn custom_prefixes_replace_defaults() {
        let opts = parse_options("url_prefixes:\n  - 'https://wiki\\.example\\.org/'\n").unwrap();
        assert!(opts.url_prefixes.patterns().eq([r"https://wiki\.example\.org/"]));
        assert_eq!(
            opts.url_prefixes.strip("[[https://wiki.example.org/Main_Page]]"),
            "[[Main_Page]]"
        );
    }

    #[test]
    fn rejects_unknown_keys_and_bad_patterns() {
        assert!(parse_options("numbered_list: true\n").is_err());
        let err = parse_options("url_prefixes: ['(']\n").unwrap_err();
        assert!(err.to_string().contains("regex parse error"), "{err}");
    }

    #[test]
    fn load_options_reports_missing_file() {
        let err = load_options(Path::new("/nonexistent/clip2wiki.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"), "{err}");
    }
}
