//! Copy Pipeline for mdclip
//!
//! This module implements the composition pipeline that turns a markdown
//! selection into a multi-representation clipboard payload: plain text,
//! HTML with inline images, and an attached bitmap.
//!
//! # Architecture
//!
//! - `types.rs` - Data model shared by all stages
//! - `services.rs` - Capability traits between pipeline and host
//! - `selection.rs` - Selection reading (CLI file host)
//! - `resolver.rs` - Embed extraction and vault resolution
//! - `encoder.rs` - PNG normalization, data URIs, platform bitmaps
//! - `guard.rs` - Clipboard size budget policy
//! - `renderer.rs` - Markdown-to-HTML rendering (comrak)
//! - `composer.rs` - Segment rewriting into the final payload
//! - `writer.rs` - System clipboard access (arboard)

pub mod composer;
pub mod encoder;
pub mod guard;
pub mod renderer;
pub mod resolver;
pub mod selection;
pub mod services;
pub mod types;
pub mod writer;

pub use composer::HtmlClipboardComposer;
pub use encoder::PngImageEncoder;
pub use guard::ClipboardSizeGuard;
pub use renderer::ComrakRenderer;
pub use resolver::VaultEmbedResolver;
pub use selection::FileSelectionSource;
pub use writer::ArboardClipboardWriter;

/// Combined embed syntax pattern used wherever the whole selection is
/// scanned: wiki embeds first, then standard markdown images.
pub(crate) const EMBED_SCAN_PATTERN: &str = r"!\[\[[^\]]+\]\]|!\[[^\]]*\]\([^)]*\)";
