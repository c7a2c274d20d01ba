// SPDX-License-Identifier: MIT
//! Project summary scan — walks the project tree and aggregates a per-file
//! symbol listing for the summarize-project command.
//!
//! Symbol extraction itself is a host collaborator: the embedding editor
//! supplies a [`SymbolSource`] backed by its syntax-tree library. This module
//! only owns the walk, the limits, and the aggregation format.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use tracing::debug;

use crate::config::ScanConfig;

/// Extracts declared symbol names from a source file. Implemented by the
/// host on top of its parsing library.
pub trait SymbolSource: Send + Sync {
    fn symbols(&self, path: &Path, text: &str) -> Vec<String>;
}

/// Extensions considered source code for the purposes of a project summary.
const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "ts", "tsx", "js", "jsx", "py", "go", "java", "kt", "swift", "c", "h", "cpp", "cc",
    "hpp", "cs", "rb", "php", "lua", "ex", "exs", "hs", "zig",
];

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Walk `root` (gitignore-aware) and build a `path: sym1, sym2, …` listing,
/// one line per source file that declares at least one symbol.
pub fn scan_project(root: &Path, symbols: &dyn SymbolSource, scan: &ScanConfig) -> Result<String> {
    ensure!(root.is_dir(), "{} is not a directory", root.display());

    let mut listing = String::new();
    let mut files = 0usize;

    // Honor .gitignore even when the project is not a git checkout.
    let walker = ignore::WalkBuilder::new(root).require_git(false).build();
    for entry in walker {
        if files >= scan.max_files {
            debug!(max_files = scan.max_files, "scan file cap reached");
            break;
        }
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!(err = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if !is_source_file(path) {
            continue;
        }
        // Binary or otherwise unreadable files are skipped, not fatal.
        let Ok(text) = std::fs::read_to_string(path) else {
            continue;
        };

        let mut names = symbols.symbols(path, &text);
        if names.is_empty() {
            continue;
        }
        names.truncate(scan.max_symbols_per_file);

        let rel = path.strip_prefix(root).unwrap_or(path);
        writeln!(listing, "{}: {}", rel.display(), names.join(", "))
            .context("formatting symbol listing")?;
        files += 1;
    }

    ensure!(
        !listing.is_empty(),
        "no source files with symbols under {}",
        root.display()
    );
    debug!(files, bytes = listing.len(), "project scan complete");
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;

    /// Treats every nonblank line starting with "fn " as a symbol.
    struct FnLineSource;

    impl SymbolSource for FnLineSource {
        fn symbols(&self, _path: &Path, text: &str) -> Vec<String> {
            text.lines()
                .filter_map(|l| l.trim().strip_prefix("fn "))
                .map(|rest| rest.split('(').next().unwrap_or(rest).to_string())
                .collect()
        }
    }

    #[test]
    fn aggregates_per_file_symbol_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn alpha() {}\nfn beta() {}\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "fn not_source() {}\n").unwrap();

        let listing = scan_project(dir.path(), &FnLineSource, &ScanConfig::default()).unwrap();
        assert_eq!(listing, "a.rs: alpha, beta\n");
    }

    #[test]
    fn honors_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".gitignore"), "generated.rs\n").unwrap();
        std::fs::write(dir.path().join("kept.rs"), "fn kept() {}\n").unwrap();
        std::fs::write(dir.path().join("generated.rs"), "fn hidden() {}\n").unwrap();

        let listing = scan_project(dir.path(), &FnLineSource, &ScanConfig::default()).unwrap();
        assert!(listing.contains("kept.rs"));
        assert!(!listing.contains("generated.rs"));
    }

    #[test]
    fn caps_files_and_symbols() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            std::fs::write(dir.path().join(format!("f{i}.rs")), "fn a() {}\nfn b() {}\nfn c() {}\n")
                .unwrap();
        }
        let scan = ScanConfig {
            max_files: 2,
            max_symbols_per_file: 2,
        };
        let listing = scan_project(dir.path(), &FnLineSource, &scan).unwrap();
        assert_eq!(listing.lines().count(), 2);
        for line in listing.lines() {
            assert_eq!(line.matches(", ").count(), 1);
        }
    }

    #[test]
    fn empty_project_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_project(dir.path(), &FnLineSource, &ScanConfig::default()).is_err());
    }
}
