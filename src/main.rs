use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use clip2wiki::{ConvertOptions, config, dom, render};

#[derive(Parser)]
#[command(name = "clip2wiki")]
#[command(about = "Convert pasted HTML into MediaWiki wikitext")]
#[command(version)]
struct Cli {
    /// HTML file to convert; reads stdin when absent or `-`
    input: Option<PathBuf>,

    /// Write wikitext here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Treat INPUT as a JSON content tree instead of HTML
    #[arg(long)]
    from_json: bool,

    /// Also write the parsed content tree as JSON to this path
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Convert every .html/.htm file under this directory
    #[arg(long, value_name = "DIR", requires = "out_dir", conflicts_with_all = ["input", "output", "json", "from_json"])]
    convert_all: Option<PathBuf>,

    /// Destination directory for --convert-all
    #[arg(long, value_name = "DIR", requires = "convert_all")]
    out_dir: Option<PathBuf>,

    /// YAML file with conversion options
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use `#` markers for items of ordered lists
    #[arg(long)]
    numbered_lists: bool,

    /// Keep wiki farm and archive URL prefixes in links
    #[arg(long)]
    keep_url_prefixes: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // logs go to stderr; stdout carries the wikitext.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let opts = resolve_options(&cli)?;

    if let (Some(html_root), Some(wiki_root)) = (&cli.convert_all, &cli.out_dir) {
        let count = clip2wiki::convert_all_in_dirs(html_root, wiki_root, &opts)?;
        eprintln!("converted {count} file(s) into {}", wiki_root.display());
        return Ok(());
    }

    let input = clip2wiki::read_input(cli.input.as_deref())?;
    let source_path = cli.input.as_deref().filter(|p| p.as_os_str() != "-");

    let root = if cli.from_json {
        clip2wiki::read_tree_json(&input)?.root
    } else {
        dom::parse_fragment(&input)
    };
    debug!(bytes = input.len(), from_json = cli.from_json, "input loaded");

    if let Some(json_path) = &cli.json {
        let file = clip2wiki::tree_file(root.clone(), source_path, input.len());
        clip2wiki::write_tree_json(&file, json_path)?;
    }

    let wikitext = render::convert(&root, &opts);

    match &cli.output {
        Some(path) => fs::write(path, format!("{wikitext}\n"))?,
        None => println!("{wikitext}"),
    }

    Ok(())
}

/// Config file first, then command-line overrides.
fn resolve_options(cli: &Cli) -> Result<ConvertOptions, Box<dyn Error>> {
    let mut opts = match &cli.config {
        Some(path) => config::load_options(path)?,
        None => ConvertOptions::default(),
    };

    if cli.numbered_lists {
        opts.numbered_lists = true;
    }
    if cli.keep_url_prefixes {
        opts.strip_url_prefixes = false;
    }

    Ok(opts)
}
