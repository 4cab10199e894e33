//! Data model for the copy pipeline
//!
//! All of these entities live for a single command execution; nothing is
//! cached across runs.

use crate::vault::VaultFile;

/// The markdown text being copied, as read from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    /// Verbatim markdown of the selection.
    pub markdown: String,
    /// Vault-relative path of the note the selection came from, if known.
    pub source_path: Option<String>,
    /// Whether the markdown contains any embed syntax at all.
    pub contains_embeds: bool,
}

/// A successfully resolved, in-vault, image-typed embed reference.
///
/// `original_link` is the exact substring matched in the markdown; the
/// composer later matches occurrences against it, so duplicates of the same
/// embed text produce multiple `ResolvedEmbed`s sharing one `original_link`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEmbed {
    pub original_link: String,
    pub file: VaultFile,
    pub buffer: Vec<u8>,
    pub mime_type: &'static str,
    pub size_bytes: usize,
}

/// Host-native bitmap handle: straight RGBA8 rows, ready for the platform
/// clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// An embed normalized to PNG, produced 1:1 from a [`ResolvedEmbed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// `data:image/png;base64,...` URI for inline HTML embedding.
    pub data_uri: String,
    /// Platform bitmap, absent only when decoding produced no pixels.
    pub bitmap: Option<Bitmap>,
    /// Byte size of the encoded PNG, not of the bitmap.
    pub size_bytes: usize,
    /// Always the normalized target format.
    pub mime_type: &'static str,
    /// The embed this image derives from.
    pub original: ResolvedEmbed,
}

/// The multi-representation clipboard payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    /// Untouched original markdown, regardless of render mode.
    pub text: String,
    /// Composed standalone HTML document.
    pub html: String,
    /// Full post-guard encoded image list, not just consumed ones.
    pub images: Vec<EncodedImage>,
    /// Warnings accumulated across all stages, flushed as one notification.
    pub warnings: Vec<String>,
}

/// Result of one embed-collection pass.
#[derive(Debug, Clone, Default)]
pub struct EmbedResolution {
    pub embeds: Vec<ResolvedEmbed>,
    pub warnings: Vec<String>,
}

/// Outcome of the size guard.
#[derive(Debug, Clone)]
pub struct GuardVerdict {
    /// When false the caller must abort without writing the clipboard.
    pub allow: bool,
    /// The image list to carry downstream; emptied when the guard stripped
    /// images for the markdown-only fallback.
    pub images: Vec<EncodedImage>,
    pub warnings: Vec<String>,
}
