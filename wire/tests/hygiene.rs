//! Hygiene — source-scan budgets for production code.
//!
//! Scans the `wire` crate's `src/` for constructs that crash the process
//! or silently drop errors. Sidecar `_test.rs` files are exempt. Budgets
//! only ever go down.

use std::fs;
use std::path::{Path, PathBuf};

const SOURCE_ROOTS: [&str; 1] = ["src"];

/// `(pattern, budget)` pairs checked by [`budget`].
const UNWRAP: (&str, usize) = (".unwrap()", 0);
const EXPECT: (&str, usize) = (".expect(", 0);
const PANIC: (&str, usize) = ("panic!(", 0);
const UNREACHABLE: (&str, usize) = ("unreachable!(", 0);
const TODO: (&str, usize) = ("todo!(", 0);
const UNIMPLEMENTED: (&str, usize) = ("unimplemented!(", 0);
const SILENT_DISCARD: (&str, usize) = ("let _ =", 0);
const DOT_OK: (&str, usize) = (".ok()", 0);
const ALLOW_DEAD_CODE: (&str, usize) = ("#[allow(dead_code)]", 0);

struct SourceFile {
    path: PathBuf,
    content: String,
}

fn production_sources() -> Vec<SourceFile> {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    for root in SOURCE_ROOTS {
        collect(&manifest.join(root), &mut files);
    }
    assert!(!files.is_empty(), "no sources found under {}", manifest.display());
    files
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.to_string_lossy().ends_with("_test.rs");
        if is_rs && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path, content });
            }
        }
    }
}

fn budget((pattern, max): (&str, usize)) {
    let hits: Vec<(String, usize)> = production_sources()
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.display().to_string(), count))
        })
        .collect();
    let found: usize = hits.iter().map(|(_, c)| c).sum();
    let listing = hits
        .iter()
        .map(|(path, count)| format!("  {path}: {count}"))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(found <= max, "`{pattern}` budget exceeded: found {found}, max {max}.\n{listing}");
}

#[test]
fn unwrap_budget() {
    budget(UNWRAP);
}

#[test]
fn expect_budget() {
    budget(EXPECT);
}

#[test]
fn panic_budget() {
    budget(PANIC);
}

#[test]
fn unreachable_budget() {
    budget(UNREACHABLE);
}

#[test]
fn todo_budget() {
    budget(TODO);
}

#[test]
fn unimplemented_budget() {
    budget(UNIMPLEMENTED);
}

#[test]
fn silent_discard_budget() {
    budget(SILENT_DISCARD);
}

#[test]
fn dot_ok_budget() {
    budget(DOT_OK);
}

#[test]
fn allow_dead_code_budget() {
    budget(ALLOW_DEAD_CODE);
}
