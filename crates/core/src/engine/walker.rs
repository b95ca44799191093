//! Deterministic directory traversal
//!
//! Produces one listing per directory under the root, ordered
//! case-insensitively by display path, each with its files ordered
//! case-insensitively by name.

use crate::models::Language;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// A file inside a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name as displayed
    pub name: String,
    /// Path used to read the file
    pub path: PathBuf,
}

/// A directory with its immediate files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// `.` for the root, `./a/b` below it
    pub display: String,
    pub files: Vec<FileEntry>,
}

impl DirListing {
    /// Display path of a file in this directory
    pub fn display_file(&self, file: &FileEntry) -> String {
        format!("{}/{}", self.display, file.name)
    }
}

/// Language of a source file, by case-insensitive extension
pub fn source_language(file_name: &str) -> Option<Language> {
    let lower = file_name.to_lowercase();
    let dot = lower.rfind('.')?;
    Language::from_extension(&lower[dot + 1..])
}

/// Root-relative display path with `/` separators
pub fn display_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        format!("./{}", parts.join("/"))
    }
}

fn case_insensitive_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Enumerate every directory under `root` with its files.
///
/// Entries that cannot be read are skipped. Symlinked directories are
/// only descended into when `follow_symlinks` is set and are never listed
/// as files.
pub fn walk_tree(root: &Path, follow_symlinks: bool) -> Vec<DirListing> {
    let mut listings: Vec<DirListing> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();

    for entry in WalkDir::new(root).follow_links(follow_symlinks) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();

        if entry.file_type().is_dir() {
            index.insert(path.to_path_buf(), listings.len());
            listings.push(DirListing {
                display: display_path(root, path),
                files: Vec::new(),
            });
            continue;
        }

        if entry.path_is_symlink() && path.is_dir() {
            continue;
        }

        let Some(slot) = path.parent().and_then(|parent| index.get(parent)) else {
            continue;
        };
        listings[*slot].files.push(FileEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: path.to_path_buf(),
        });
    }

    listings.sort_by(|a, b| case_insensitive_order(&a.display, &b.display));
    for listing in &mut listings {
        listing
            .files
            .sort_by(|a, b| case_insensitive_order(&a.name, &b.name));
    }

    listings
}
