//! Vault directory access
//!
//! A vault is the directory tree the copied note lives in. Embed targets are
//! located against it three ways, in order: a shortlink lookup (bare file
//! name anywhere in the vault, like wiki-style links use), an exact
//! vault-rooted path, and a path resolved relative to the source note.

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file located inside the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultFile {
    /// Vault-relative path, `/`-separated on every platform.
    pub path: String,
    /// Absolute filesystem path.
    pub abs_path: PathBuf,
    /// File extension without the dot, as it appears on disk.
    pub extension: String,
}

/// Handle to an opened vault root directory.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Open a vault rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Vault> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::VaultNotFound(root.to_path_buf()));
        }
        Ok(Vault {
            root: root.canonicalize()?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up an exact vault-rooted path.
    ///
    /// A leading `/` is treated as vault-rooted, matching how absolute wiki
    /// links are written. Paths containing `..` segments are not accepted
    /// here; relative traversal goes through [`Vault::join_relative`].
    pub fn lookup_path(&self, target: &str) -> Option<VaultFile> {
        let rel = target.trim_start_matches('/');
        if rel.is_empty() || rel.split('/').any(|segment| segment == "..") {
            return None;
        }
        let abs = self.root.join(rel);
        if abs.is_file() {
            Some(self.vault_file(rel.to_string(), abs))
        } else {
            None
        }
    }

    /// Look up a shortlink target, e.g. `photo.png` or `media/photo.png`,
    /// anywhere in the vault.
    ///
    /// Deterministic preference order: an exact vault-rooted match, then a
    /// match inside the source note's own directory, then the
    /// lexicographically first match.
    pub fn lookup_shortlink(&self, target: &str, source_path: Option<&str>) -> Option<VaultFile> {
        if let Some(file) = self.lookup_path(target) {
            return Some(file);
        }

        let normalized = target.trim_start_matches('/');
        if normalized.is_empty() {
            return None;
        }
        let suffix = format!("/{}", normalized);

        let mut candidates: Vec<String> = Vec::new();
        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(rel) = self.relative_of(entry.path()) else {
                continue;
            };
            if rel.ends_with(&suffix) {
                candidates.push(rel);
            }
        }

        if candidates.is_empty() {
            return None;
        }
        candidates.sort();

        if let Some(source) = source_path {
            let source_dir = match source.rfind('/') {
                Some(index) => &source[..index],
                None => "",
            };
            let preferred = if source_dir.is_empty() {
                normalized.to_string()
            } else {
                format!("{}/{}", source_dir, normalized)
            };
            if candidates.iter().any(|c| *c == preferred) {
                return self.lookup_path(&preferred);
            }
        }

        let first = candidates.swap_remove(0);
        self.lookup_path(&first)
    }

    /// Vault-relative `/`-separated path of an absolute path, if it is
    /// inside the vault.
    pub fn relative_of(&self, abs: &Path) -> Option<String> {
        let rel = abs.strip_prefix(&self.root).ok()?;
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

    /// Resolve `target` relative to the directory of `source_path`.
    ///
    /// Pure string computation over `/`-separated vault paths. `.` and empty
    /// segments are skipped; `..` pops at most down to the vault root and
    /// never escapes it. A leading `/` on the target makes it vault-rooted.
    pub fn join_relative(source_path: &str, target: &str) -> String {
        if let Some(rooted) = target.strip_prefix('/') {
            return rooted.to_string();
        }

        let mut segments: Vec<&str> = source_path.split('/').collect();
        segments.pop(); // drop the source file name

        for segment in target.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }

        segments.join("/")
    }

    /// Read the raw bytes of a vault file.
    pub fn read(&self, file: &VaultFile) -> Result<Vec<u8>> {
        Ok(fs::read(&file.abs_path)?)
    }

    fn vault_file(&self, path: String, abs_path: PathBuf) -> VaultFile {
        let extension = abs_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_string();
        VaultFile {
            path,
            abs_path,
            extension,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
