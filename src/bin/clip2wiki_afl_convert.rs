//! AFL++ fuzz target for `clip2wiki`.
//!
//! Stdin-driven, so it can be used with AFL++. Build and run it via `cargo-afl`:
//!
//! ```bash
//! cargo install cargo-afl
//!
//! cargo afl build --release --features afl_fuzz --bin clip2wiki_afl_convert
//!
//! mkdir -p fuzz/afl/out
//!
//! cargo afl fuzz \
//!   -i fuzz/afl/in \
//!   -o fuzz/afl/out \
//!   target/release/clip2wiki_afl_convert
//! ```
//!
//! Rust panics normally unwind and exit with a non-crashing status code.
//! AFL++ only treats crashes as signals/aborts, so any unwind becomes `abort()`.

use std::io::Read;

use clip2wiki::{ConvertOptions, dom, normalize, render};

const MAX_INPUT_LEN: usize = 1_000_000; // 1MB guardrail; AFL++ will typically cap this anyway.

fn check_depth(node: &dom::Node, depth: usize) {
    // parse_fragment clamps element nesting; text leaves may sit one level below.
    assert!(
        depth <= dom::MAX_TREE_DEPTH + 2,
        "tree deeper than the clamp: {depth}"
    );
    for child in node.children() {
        check_depth(child, depth + 1);
    }
}

fn run_one_input(data: &[u8]) {
    if data.len() > MAX_INPUT_LEN {
        return;
    }

    // clipboard payloads should be UTF-8, but AFL++ will happily hand us arbitrary bytes.
    let src = String::from_utf8_lossy(data).to_string();

    let root = dom::parse_fragment(&src);
    check_depth(&root, 1);

    let file = dom::TreeFile {
        schema_version: dom::SCHEMA_VERSION,
        generator: dom::GeneratorInfo {
            name: dom::GENERATOR_NAME.to_string(),
            version: dom::GENERATOR_VERSION.to_string(),
        },
        source: dom::SourceInfo {
            path: None,
            byte_len: src.len() as u64,
        },
        root,
    };

    // JSON round-trip must never panic, and must be lossless.
    let json = serde_json::to_vec(&file).unwrap();
    let back: dom::TreeFile = serde_json::from_slice(&json).unwrap();
    assert_eq!(back.root, file.root);

    for opts in [
        ConvertOptions::default(),
        ConvertOptions {
            numbered_lists: true,
            strip_url_prefixes: false,
            ..ConvertOptions::default()
        },
    ] {
        let out = render::convert(&back.root, &opts);
        assert_eq!(normalize::normalize(&out), out, "normalizer is not idempotent");
    }
}

fn main() {
    let mut data = Vec::new();
    std::io::stdin().read_to_end(&mut data).unwrap();

    // convert any panic into an abort().
    if std::panic::catch_unwind(|| run_one_input(&data)).is_err() {
        std::process::abort();
    }
}
