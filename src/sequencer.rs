//! Output file naming: `A`, `B`, ..., `Z`, `AA`, `AB`, ... plus an extension,
//! skipping anything already present in the output directory.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const ALPHABET_LEN: usize = 26;

/// Source of the entry names a new label must not collide with.
pub trait NameSource {
    fn existing_names(&self) -> Result<HashSet<String>>;
}

/// Lists the entries of a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryNames {
    dir: PathBuf,
}

impl DirectoryNames {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl NameSource for DirectoryNames {
    fn existing_names(&self) -> Result<HashSet<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("failed to list directory '{}'", self.dir.display()))?;
        let mut names = HashSet::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("failed to read entry in '{}'", self.dir.display()))?;
            // Non UTF-8 names can never match an ASCII label.
            if let Ok(name) = entry.file_name().into_string() {
                names.insert(name);
            }
        }
        Ok(names)
    }
}

/// Base-26 letters for `index`, most significant first (0 -> "A", 26 -> "AA").
pub fn label_for_index(index: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = index;
    loop {
        letters.push(char::from(b'A' + (remaining % ALPHABET_LEN) as u8));
        let next = remaining / ALPHABET_LEN;
        if next == 0 {
            break;
        }
        remaining = next - 1;
    }
    letters.iter().rev().collect()
}

/// First label in the sequence that is not already taken.
pub fn next_label(existing: &HashSet<String>, extension: &str) -> String {
    (0..)
        .map(|index| format!("{}{extension}", label_for_index(index)))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_default()
}

/// Refresh the listing and pick the next label from it.
pub fn next_label_from(names: &dyn NameSource, extension: &str) -> Result<String> {
    let existing = names.existing_names()?;
    Ok(next_label(&existing, extension))
}
