//! Resource file discovery
//!
//! A registered source directory contains one subdirectory per locale, and
//! every `.ron` file below that subdirectory contributes entries. A missing
//! locale subdirectory is an empty result, never an error.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::ident::LocaleId;

/// Expected resource file extension, matched case-insensitively.
pub const RESOURCE_EXTENSION: &str = "ron";

/// Lists the resource files for `locale` under `dir`, recursing into
/// subdirectories, in a deterministic walk order.
pub fn list_resource_files(dir: &Path, locale: &LocaleId) -> Vec<PathBuf> {
    let root = dir.join(locale.to_string());
    if !root.is_dir() {
        return Vec::new();
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(&root).sort_by_file_name();
    for entry in walker.into_iter().filter_map(|entry| entry.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(RESOURCE_EXTENSION))
            .unwrap_or(false);
        if matches {
            files.push(entry.into_path());
        }
    }
    files
}

/// Lists the locale subdirectories of `dir` whose names are valid
/// identifiers, sorted by name for a stable enumeration order.
pub fn list_locale_dirs(dir: &Path) -> Vec<LocaleId> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut locales: Vec<LocaleId> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().and_then(|name| name.parse().ok()))
        .collect();
    locales.sort();
    locales
}
