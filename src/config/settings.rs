//! User settings for mdclip
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence, plus the shared
//! `SettingsStore` handle that lets pipeline stages read settings fresh at
//! each call.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

// ─────────────────────────────────────────────────────────────────────────────
// Copy Format Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// How the clipboard HTML body is produced from the selection markdown.
///
/// Two modes are available:
/// - `Markdown`: the markdown source is kept verbatim, HTML-escaped, so the
///   paste target sees the raw markdown text (with images substituted inline)
/// - `Html`: the markdown is rendered to HTML before copying, so the paste
///   target sees formatted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CopyFormat {
    /// Escaped markdown source with inline images (default)
    #[default]
    Markdown,
    /// Rendered HTML with inline images
    Html,
}

impl CopyFormat {
    /// Get the display name for the format.
    pub fn display_name(&self) -> &'static str {
        match self {
            CopyFormat::Markdown => "markdown",
            CopyFormat::Html => "html",
        }
    }

    /// Parse a format name as given on the command line.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "markdown" => Some(CopyFormat::Markdown),
            "html" => Some(CopyFormat::Html),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Default clipboard payload budget: 3 MiB of encoded image data.
pub const DEFAULT_SIZE_LIMIT: u64 = 3 * 1024 * 1024;

/// Upper bound accepted for the size limit; larger configured values are
/// clamped during sanitization.
pub const MAX_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

/// All user-configurable options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Aggregate byte budget for encoded images; 0 disables enforcement.
    pub clipboard_size_limit: u64,

    /// When the budget is exceeded, strip images and copy markdown only
    /// instead of refusing the whole copy.
    pub markdown_only_fallback: bool,

    /// Rendering mode for the clipboard HTML body.
    pub copy_format: CopyFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            clipboard_size_limit: DEFAULT_SIZE_LIMIT,
            markdown_only_fallback: true,
            copy_format: CopyFormat::default(),
        }
    }
}

impl Settings {
    /// Clamp out-of-range values to safe bounds.
    pub fn sanitize(&mut self) {
        if self.clipboard_size_limit > MAX_SIZE_LIMIT {
            self.clipboard_size_limit = MAX_SIZE_LIMIT;
        }
    }

    /// Parse settings from JSON and sanitize the result.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings Store
// ─────────────────────────────────────────────────────────────────────────────

/// Shared settings handle.
///
/// The guard and the composer read configuration fresh at each call, so they
/// hold a clone of this store rather than a snapshot taken at construction.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        SettingsStore {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Current settings snapshot.
    pub fn get(&self) -> Settings {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Apply a mutation to the shared settings.
    pub fn update(&self, apply: impl FnOnce(&mut Settings)) {
        match self.inner.write() {
            Ok(mut guard) => apply(&mut guard),
            Err(poisoned) => apply(&mut poisoned.into_inner()),
        }
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        SettingsStore::new(Settings::default())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
