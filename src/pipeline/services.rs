//! Trait seams between the copy pipeline and its host
//!
//! Selection reading, image codec access, markdown rendering, and clipboard
//! access all sit behind narrow capability traits so the pipeline itself is
//! host-agnostic. Adapters are injected at construction; there are no global
//! singletons.

use crate::error::Result;
use crate::pipeline::types::{
    ClipboardPayload, EmbedResolution, EncodedImage, GuardVerdict, ResolvedEmbed,
    SelectionSnapshot,
};

/// Provides the markdown selection to copy.
pub trait SelectionSource {
    /// `Ok(None)` means there is nothing selected; errors mean the host
    /// could not be read at all.
    fn active_selection(&self) -> Result<Option<SelectionSnapshot>>;
}

/// Extracts embed references from markdown and resolves them to vault files.
pub trait EmbedResolver {
    /// Never fails for an individual bad reference; those become warnings.
    /// An error here means the resolver itself broke down.
    fn collect_embeds(&self, markdown: &str, source_path: Option<&str>)
        -> Result<EmbedResolution>;
}

/// Normalizes resolved embed bytes into an encoded image.
pub trait ImageEncoder {
    fn encode(&self, embed: &ResolvedEmbed) -> Result<EncodedImage>;
}

/// Enforces the clipboard size budget.
pub trait ClipboardGuard {
    /// Takes ownership of the image list and returns it (possibly emptied)
    /// in the verdict.
    fn ensure_within_limits(&self, images: Vec<EncodedImage>) -> Result<GuardVerdict>;
}

/// Rewrites the selection into the final clipboard payload.
pub trait ClipboardComposer {
    fn compose(
        &self,
        selection: &SelectionSnapshot,
        embeds: &[ResolvedEmbed],
        encoded_images: Vec<EncodedImage>,
    ) -> Result<ClipboardPayload>;
}

/// Writes a composed payload to the system clipboard.
pub trait ClipboardWriter {
    fn write(&self, payload: &ClipboardPayload) -> Result<()>;
}

/// Renders markdown to HTML (rendered copy mode only).
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str, source_path: Option<&str>) -> String;
}
