//! Selection reading for the CLI host
//!
//! The "active selection" of the CLI is a note file inside the vault,
//! optionally narrowed to a 1-based inclusive line range. An empty note or
//! an empty range means nothing is selected.

use crate::error::{Error, Result};
use crate::pipeline::services::SelectionSource;
use crate::pipeline::types::SelectionSnapshot;
use crate::pipeline::EMBED_SCAN_PATTERN;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads the selection from a note file on disk.
pub struct FileSelectionSource {
    vault_root: PathBuf,
    note: PathBuf,
    lines: Option<(usize, usize)>,
    embed_pattern: Regex,
}

impl FileSelectionSource {
    pub fn new(vault_root: PathBuf, note: PathBuf, lines: Option<(usize, usize)>) -> Self {
        FileSelectionSource {
            vault_root,
            note,
            lines,
            embed_pattern: Regex::new(EMBED_SCAN_PATTERN).expect("valid embed pattern"),
        }
    }

    fn note_path(&self) -> PathBuf {
        if self.note.is_absolute() {
            self.note.clone()
        } else {
            self.vault_root.join(&self.note)
        }
    }

    fn source_path_of(&self, abs: &Path) -> Option<String> {
        let rel = abs.strip_prefix(&self.vault_root).ok()?;
        let segments: Vec<&str> = rel
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        }
    }
}

impl SelectionSource for FileSelectionSource {
    fn active_selection(&self) -> Result<Option<SelectionSnapshot>> {
        let path = self.note_path();
        let contents = fs::read_to_string(&path)
            .map_err(|e| Error::SelectionRead(format!("{}: {}", path.display(), e)))?;

        let markdown = match self.lines {
            None => contents,
            Some((start, end)) => {
                let lines: Vec<&str> = contents.lines().collect();
                if start > lines.len() {
                    String::new()
                } else {
                    let end = end.min(lines.len());
                    lines[start - 1..end].join("\n")
                }
            }
        };

        if markdown.is_empty() {
            return Ok(None);
        }

        let contains_embeds = self.embed_pattern.is_match(&markdown);
        Ok(Some(SelectionSnapshot {
            source_path: self.source_path_of(&path),
            markdown,
            contains_embeds,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
