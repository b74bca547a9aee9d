pub mod config;
pub mod dom;
pub mod normalize;
pub mod render;

pub use render::ConvertOptions;

use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Convert a pasted markup fragment to wikitext.
pub fn html_to_wikitext(html: &str, opts: &ConvertOptions) -> String {
    let root = dom::parse_fragment(html);
    render::convert(&root, opts)
}

/// Read the input text from `path`, or from stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String, Box<dyn Error>> {
    let bytes = match path {
        Some(p) if p != Path::new("-") => fs::read(p)
            .map_err(|e| format!("failed to read {}: {e}", p.display()))?,
        _ => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    // clipboard dumps are not always valid UTF-8; fall back to lossy conversion.
    Ok(String::from_utf8(bytes).unwrap_or_else(|e| {
        warn!(
            valid_up_to = e.utf8_error().valid_up_to(),
            "input is not valid UTF-8; decoding lossily"
        );
        String::from_utf8_lossy(&e.into_bytes()).into_owned()
    }))
}

/// Wrap a parsed tree in the JSON envelope.
pub fn tree_file(root: dom::Node, source_path: Option<&Path>, byte_len: usize) -> dom::TreeFile {
    dom::TreeFile {
        schema_version: dom::SCHEMA_VERSION,
        generator: dom::GeneratorInfo {
            name: dom::GENERATOR_NAME.to_string(),
            version: dom::GENERATOR_VERSION.to_string(),
        },
        source: dom::SourceInfo {
            path: source_path.map(|p| p.to_string_lossy().to_string()),
            byte_len: byte_len as u64,
        },
        root,
    }
}

/// Write a tree envelope as pretty JSON, so it's easy to inspect / diff.
pub fn write_tree_json(file: &dom::TreeFile, json_path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(file)?;
    fs::write(json_path, json)?;
    Ok(())
}

/// Read a tree envelope produced by `--json` (or by an external parser).
pub fn read_tree_json(text: &str) -> Result<dom::TreeFile, Box<dyn Error>> {
    let file: dom::TreeFile = serde_json::from_str(text)?;
    if file.schema_version > dom::SCHEMA_VERSION {
        return Err(format!(
            "unsupported tree schema version {} (newest supported: {})",
            file.schema_version,
            dom::SCHEMA_VERSION
        )
        .into());
    }
    Ok(file)
}

/// Bulk mode: walk `html_root` and write a `.wiki` file under `wiki_root` for every
/// `.html` / `.htm` file, keeping the relative directory structure.
///
/// Returns the number of files converted.
pub fn convert_all_in_dirs(
    html_root: &Path,
    wiki_root: &Path,
    opts: &ConvertOptions,
) -> Result<usize, Box<dyn Error>> {
    let start_time = Instant::now();

    if !html_root.is_dir() {
        return Err(format!("HTML source directory not found: {}", html_root.display()).into());
    }

    let mut entries: Vec<_> = WalkDir::new(html_root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_html_file(e.path()))
        .collect();

    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let total = entries.len();
    let mut count = 0;

    for entry in entries {
        let path = entry.path();
        // mirror the source layout under wiki_root.
        let relative = path.strip_prefix(html_root)?;

        let mut wiki_path = wiki_root.join(relative);
        wiki_path.set_extension("wiki");

        if let Some(parent) = wiki_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let html = read_input(Some(path))?;
        let mut wikitext = html_to_wikitext(&html, opts);
        wikitext.push('\n');
        fs::write(&wiki_path, &wikitext)?;

        count += 1;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            progress = %format!("{count}/{total}"),
            elapsed_ms,
            path = %wiki_path.display(),
            "converted"
        );
    }

    let total_secs = start_time.elapsed().as_secs_f64();
    let avg = if count > 0 {
        format!("{:.3}s", total_secs / count as f64)
    } else {
        "-".to_string()
    };
    info!(count, total_secs, avg_per_doc = avg.as_str(), "batch conversion done");

    Ok(count)
}

fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}
