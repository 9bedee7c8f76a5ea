//! Recursive Python script scanner.
//!
//! Walks a directory tree, skipping the virtual environment directory, and
//! counts lines, function definitions and class definitions per `.py` file.
//! Symlinks are followed; walkdir reports link loops as errors and a set of
//! canonical paths keeps a file reachable through two links from being
//! counted twice.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalScript {
    /// Path relative to the scan root.
    pub path: PathBuf,
    pub line_count: usize,
    pub function_count: usize,
    pub class_count: usize,
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_whitespace()))
}

/// Tally one line into `script`.
fn count_line(script: &mut LocalScript, line: &str) {
    script.line_count += 1;
    let trimmed = line.trim_start();
    let def_line = trimmed.strip_prefix("async").map_or(trimmed, str::trim_start);
    if starts_with_keyword(def_line, "def") {
        script.function_count += 1;
    } else if starts_with_keyword(trimmed, "class") {
        script.class_count += 1;
    }
}

/// Count a single source file.
pub fn count_source<R: BufRead>(path: PathBuf, reader: R) -> std::io::Result<LocalScript> {
    let mut script = LocalScript {
        path,
        ..LocalScript::default()
    };
    for line in reader.lines() {
        count_line(&mut script, &line?);
    }
    Ok(script)
}

fn is_python_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "py")
}

/// Scan `root` recursively. Unreadable entries are skipped, not fatal.
pub fn scan_scripts(root: &Path, venv_dir_name: &str) -> Result<Vec<LocalScript>, AppError> {
    if !root.is_dir() {
        return Err(AppError::path_io(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "script root is not a directory"),
        ));
    }

    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut scripts = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.file_type().is_dir() && e.depth() > 0 && e.file_name() == venv_dir_name));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping entry during script scan: {}", e);
                continue;
            }
        };
        if !is_python_file(&entry) {
            continue;
        }

        let canonical = entry
            .path()
            .canonicalize()
            .unwrap_or_else(|_| entry.path().to_path_buf());
        if !visited.insert(canonical) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();

        match File::open(entry.path()).and_then(|f| count_source(relative, BufReader::new(f))) {
            Ok(script) => scripts.push(script),
            Err(e) => warn!("Failed to read {}: {}", entry.path().display(), e),
        }
    }

    debug!("Scanned {} scripts under {}", scripts.len(), root.display());
    Ok(scripts)
}
