//! Embed extraction and resolution
//!
//! Scans the selection markdown for the two embed syntaxes, resolves each
//! reference against the vault, and reads the image bytes. Each reference
//! that cannot be resolved produces exactly one warning and is otherwise
//! skipped; only a broken resolver aborts the pass.

use crate::error::Result;
use crate::pipeline::services::EmbedResolver;
use crate::pipeline::types::{EmbedResolution, ResolvedEmbed};
use crate::vault::{Vault, VaultFile};
use regex::Regex;

/// Wiki-style embed: `![[target]]` or `![[target|alias]]`.
const WIKI_EMBED_PATTERN: &str = r"!\[\[([^\]]+)\]\]";

/// Standard markdown image: `![alt](target)`.
const MD_IMAGE_PATTERN: &str = r"!\[[^\]]*\]\(([^)]+)\)";

/// Absolute URI scheme, e.g. `https://`.
const EXTERNAL_LINK_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9+.\-]*://";

/// One extracted embed occurrence: the exact matched substring plus the
/// cleaned target path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EmbedReference {
    start: usize,
    original: String,
    target: String,
}

/// Outcome of resolving a single reference.
enum Resolution {
    Embed(Box<ResolvedEmbed>),
    Warning(String),
}

/// Resolves embed references against a vault directory.
pub struct VaultEmbedResolver {
    vault: Vault,
    wiki_pattern: Regex,
    image_pattern: Regex,
    external_pattern: Regex,
}

impl VaultEmbedResolver {
    pub fn new(vault: Vault) -> Self {
        // The patterns are fixed strings; compilation cannot fail.
        VaultEmbedResolver {
            vault,
            wiki_pattern: Regex::new(WIKI_EMBED_PATTERN).expect("valid wiki embed pattern"),
            image_pattern: Regex::new(MD_IMAGE_PATTERN).expect("valid image pattern"),
            external_pattern: Regex::new(EXTERNAL_LINK_PATTERN).expect("valid scheme pattern"),
        }
    }

    /// Scan for both embed syntaxes and union the matches in document order.
    fn extract(&self, markdown: &str) -> Vec<EmbedReference> {
        let mut references = Vec::new();

        for captures in self.wiki_pattern.captures_iter(markdown) {
            let whole = captures.get(0).expect("match has a whole group");
            if let Some(target) = parse_wiki_target(&captures[1]) {
                references.push(EmbedReference {
                    start: whole.start(),
                    original: whole.as_str().to_string(),
                    target,
                });
            }
        }

        for captures in self.image_pattern.captures_iter(markdown) {
            let whole = captures.get(0).expect("match has a whole group");
            if let Some(target) = parse_markdown_target(&captures[1]) {
                references.push(EmbedReference {
                    start: whole.start(),
                    original: whole.as_str().to_string(),
                    target,
                });
            }
        }

        references.sort_by_key(|reference| reference.start);
        references
    }

    fn resolve_reference(
        &self,
        reference: &EmbedReference,
        source_path: Option<&str>,
    ) -> Result<Resolution> {
        let target = &reference.target;

        if self.is_external_link(target) {
            return Ok(Resolution::Warning(format!(
                "Skipping external image link: {}",
                target
            )));
        }

        let Some(file) = self.locate(target, source_path) else {
            return Ok(Resolution::Warning(format!("Missing image file: {}", target)));
        };

        if mime_for_extension(&file.extension).is_none() {
            return Ok(Resolution::Warning(format!(
                "Unsupported embed type: {}",
                file.path
            )));
        }

        let buffer = self.vault.read(&file)?;
        if buffer.is_empty() {
            return Ok(Resolution::Warning(format!("Empty image file: {}", file.path)));
        }

        let Some(mime_type) = mime_for_extension(&file.extension) else {
            return Ok(Resolution::Warning(format!(
                "Unknown image format: {}",
                file.path
            )));
        };

        Ok(Resolution::Embed(Box::new(ResolvedEmbed {
            original_link: reference.original.clone(),
            size_bytes: buffer.len(),
            file,
            buffer,
            mime_type,
        })))
    }

    /// First hit wins: shortlink (which covers exact vault-rooted paths),
    /// then relative to the source note's directory.
    fn locate(&self, target: &str, source_path: Option<&str>) -> Option<VaultFile> {
        if let Some(file) = self.vault.lookup_shortlink(target, source_path) {
            return Some(file);
        }
        if let Some(source) = source_path {
            let joined = Vault::join_relative(source, target);
            if let Some(file) = self.vault.lookup_path(&joined) {
                return Some(file);
            }
        }
        None
    }

    fn is_external_link(&self, target: &str) -> bool {
        self.external_pattern.is_match(target) || target.starts_with("data:")
    }
}

impl EmbedResolver for VaultEmbedResolver {
    fn collect_embeds(
        &self,
        markdown: &str,
        source_path: Option<&str>,
    ) -> Result<EmbedResolution> {
        let mut resolution = EmbedResolution::default();

        for reference in self.extract(markdown) {
            match self.resolve_reference(&reference, source_path) {
                Ok(Resolution::Embed(embed)) => resolution.embeds.push(*embed),
                Ok(Resolution::Warning(warning)) => resolution.warnings.push(warning),
                Err(error) => resolution.warnings.push(format!(
                    "Failed to resolve {}: {}",
                    reference.target, error
                )),
            }
        }

        Ok(resolution)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Target Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Target of a wiki embed: everything before an optional `|alias` and
/// optional `#fragment`, trimmed.
fn parse_wiki_target(raw: &str) -> Option<String> {
    let path_part = raw.split('|').next().unwrap_or("");
    let trimmed = path_part.trim();
    if trimmed.is_empty() {
        return None;
    }
    let target = trimmed.split('#').next().unwrap_or("").trim();
    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}

/// Target of a markdown image: angle brackets and quotes stripped, trailing
/// ` title` cut at the first space.
fn parse_markdown_target(raw: &str) -> Option<String> {
    let mut target = raw.trim();
    if target.is_empty() {
        return None;
    }

    if target.len() >= 2 && target.starts_with('<') && target.ends_with('>') {
        target = target[1..target.len() - 1].trim();
    }

    if target.len() >= 2
        && ((target.starts_with('"') && target.ends_with('"'))
            || (target.starts_with('\'') && target.ends_with('\'')))
    {
        target = target[1..target.len() - 1].trim();
    }

    if let Some(index) = target.find(' ') {
        target = &target[..index];
    }

    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}

/// MIME type for a known raster image extension.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" | "svgz" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
