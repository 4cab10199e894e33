//! System clipboard access
//!
//! Writes the composed payload through arboard. HTML is set with the raw
//! markdown as the plain-text alternative, so rich-text consumers get the
//! composed document and plain editors get the untouched source.

use crate::error::{Error, Result};
use crate::pipeline::services::ClipboardWriter;
use crate::pipeline::types::{ClipboardPayload, EncodedImage};
use arboard::Clipboard;
use log::debug;

/// Clipboard writer backed by the arboard crate.
pub struct ArboardClipboardWriter;

impl ClipboardWriter for ArboardClipboardWriter {
    fn write(&self, payload: &ClipboardPayload) -> Result<()> {
        let mut clipboard =
            Clipboard::new().map_err(|e| Error::ClipboardAccess(e.to_string()))?;

        // arboard replaces the whole clipboard on every set call, so the
        // HTML representation (which carries every image inline as a data
        // URI) takes precedence over the primary bitmap.
        if let Some(primary) = pick_primary_image(&payload.images) {
            if let Some(bitmap) = &primary.bitmap {
                debug!(
                    "primary clipboard image: {}x{} from {}",
                    bitmap.width, bitmap.height, primary.original.file.path
                );
            }
        }

        clipboard
            .set_html(&payload.html, Some(&payload.text))
            .map_err(|e| Error::ClipboardWrite(e.to_string()))?;

        Ok(())
    }
}

/// First image with a usable platform bitmap, if any.
pub fn pick_primary_image(images: &[EncodedImage]) -> Option<&EncodedImage> {
    images.iter().find(|image| image.bitmap.is_some())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Bitmap, ResolvedEmbed};
    use crate::vault::VaultFile;
    use std::path::PathBuf;

    fn image(name: &str, bitmap: Option<Bitmap>) -> EncodedImage {
        EncodedImage {
            data_uri: "data:image/png;base64,AAAA".to_string(),
            bitmap,
            size_bytes: 4,
            mime_type: "image/png",
            original: ResolvedEmbed {
                original_link: format!("![[{}]]", name),
                file: VaultFile {
                    path: name.to_string(),
                    abs_path: PathBuf::from(name),
                    extension: "png".to_string(),
                },
                buffer: vec![0; 4],
                mime_type: "image/png",
                size_bytes: 4,
            },
        }
    }

    fn tiny_bitmap() -> Bitmap {
        Bitmap {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
        }
    }

    #[test]
    fn test_pick_primary_skips_images_without_bitmap() {
        let images = vec![
            image("a.png", None),
            image("b.png", Some(tiny_bitmap())),
            image("c.png", Some(tiny_bitmap())),
        ];
        let primary = pick_primary_image(&images).unwrap();
        assert_eq!(primary.original.file.path, "b.png");
    }

    #[test]
    fn test_pick_primary_none_when_no_bitmaps() {
        let images = vec![image("a.png", None)];
        assert!(pick_primary_image(&images).is_none());
        assert!(pick_primary_image(&[]).is_none());
    }

    // Note: Actual clipboard writes require a display/clipboard context
    // which isn't typically available in CI environments.
}
