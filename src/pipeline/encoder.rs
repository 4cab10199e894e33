//! Image normalization
//!
//! Every resolved embed is normalized to PNG: the encoder produces a base64
//! data URI for inline HTML embedding plus an RGBA bitmap for the platform
//! clipboard. Bytes that are already PNG are kept as-is instead of being
//! re-encoded.

use crate::error::{Error, Result};
use crate::pipeline::services::ImageEncoder;
use crate::pipeline::types::{Bitmap, EncodedImage, ResolvedEmbed};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::ImageFormat;
use std::io::Cursor;

/// Encoder backed by the `image` crate.
pub struct PngImageEncoder;

impl ImageEncoder for PngImageEncoder {
    fn encode(&self, embed: &ResolvedEmbed) -> Result<EncodedImage> {
        let decoded = image::load_from_memory(&embed.buffer).map_err(|_| Error::ImageDecode {
            path: embed.file.path.clone(),
        })?;

        let png_bytes = if embed.mime_type == "image/png" {
            embed.buffer.clone()
        } else {
            let mut out = Vec::new();
            decoded
                .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
                .map_err(|_| Error::PngConvert {
                    path: embed.file.path.clone(),
                })?;
            out
        };
        if png_bytes.is_empty() {
            return Err(Error::PngConvert {
                path: embed.file.path.clone(),
            });
        }

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        let bitmap = if width == 0 || height == 0 {
            None
        } else {
            Some(Bitmap {
                width,
                height,
                rgba: rgba.into_raw(),
            })
        };

        Ok(EncodedImage {
            data_uri: format!("data:image/png;base64,{}", BASE64.encode(&png_bytes)),
            bitmap,
            size_bytes: png_bytes.len(),
            mime_type: "image/png",
            original: embed.clone(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
