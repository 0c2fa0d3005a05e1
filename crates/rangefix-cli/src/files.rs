// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expansion of command-line paths into the Go files to process.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["vendor", "testdata"];

/// Files named on the command line are taken as-is; directories are walked
/// for `*.go` files. Walk errors are returned alongside the files found.
pub fn collect(paths: &[PathBuf]) -> (Vec<PathBuf>, Vec<walkdir::Error>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        let walker = WalkDir::new(path).into_iter().filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e));
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_go_file(entry.path()) => {
                    found.push(entry.into_path());
                }
                Ok(_) => {}
                Err(err) => errors.push(err),
            }
        }
        found.sort();
        files.extend(found);
    }

    files.dedup();
    (files, errors)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with('_') || SKIPPED_DIRS.contains(&name.as_ref())
}

fn is_go_file(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("go")
}
