//! Clipboard size budget enforcement
//!
//! Compares the aggregate encoded-image size against the configured limit.
//! Over budget, the guard either refuses the copy or strips every image and
//! lets the markdown-only payload through, depending on the fallback setting.

use crate::config::SettingsStore;
use crate::error::Result;
use crate::pipeline::services::ClipboardGuard;
use crate::pipeline::types::{EncodedImage, GuardVerdict};

/// Size guard reading its budget from the shared settings at each call.
pub struct ClipboardSizeGuard {
    settings: SettingsStore,
}

impl ClipboardSizeGuard {
    pub fn new(settings: SettingsStore) -> Self {
        ClipboardSizeGuard { settings }
    }
}

impl ClipboardGuard for ClipboardSizeGuard {
    fn ensure_within_limits(&self, images: Vec<EncodedImage>) -> Result<GuardVerdict> {
        let settings = self.settings.get();
        let limit = settings.clipboard_size_limit;

        if limit == 0 || images.is_empty() {
            return Ok(GuardVerdict {
                allow: true,
                images,
                warnings: Vec::new(),
            });
        }

        let total: u64 = images.iter().map(|image| image.size_bytes as u64).sum();
        if total <= limit {
            return Ok(GuardVerdict {
                allow: true,
                images,
                warnings: Vec::new(),
            });
        }

        let formatted_total = format_bytes(total);
        let formatted_limit = format_bytes(limit);

        if !settings.markdown_only_fallback {
            return Ok(GuardVerdict {
                allow: false,
                images,
                warnings: vec![format!(
                    "Clipboard payload {} exceeds limit {}. Adjust settings or reduce image size.",
                    formatted_total, formatted_limit
                )],
            });
        }

        Ok(GuardVerdict {
            allow: true,
            images: Vec::new(),
            warnings: vec![format!(
                "Images skipped: payload {} exceeds limit {}. Markdown content copied instead.",
                formatted_total, formatted_limit
            )],
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte Formatting
// ─────────────────────────────────────────────────────────────────────────────

/// Human-format a byte count: whole bytes, otherwise one decimal place.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024_f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);

    if exponent == 0 {
        format!("{} B", bytes)
    } else {
        let value = bytes as f64 / 1024_f64.powi(exponent as i32);
        format!("{:.1} {}", value, UNITS[exponent])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::pipeline::types::ResolvedEmbed;
    use crate::vault::VaultFile;
    use std::path::PathBuf;

    fn image_of_size(size_bytes: usize) -> EncodedImage {
        EncodedImage {
            data_uri: "data:image/png;base64,AAAA".to_string(),
            bitmap: None,
            size_bytes,
            mime_type: "image/png",
            original: ResolvedEmbed {
                original_link: "![[img.png]]".to_string(),
                file: VaultFile {
                    path: "img.png".to_string(),
                    abs_path: PathBuf::from("/vault/img.png"),
                    extension: "png".to_string(),
                },
                buffer: vec![0; size_bytes],
                mime_type: "image/png",
                size_bytes,
            },
        }
    }

    fn guard_with(limit: u64, fallback: bool) -> ClipboardSizeGuard {
        let settings = Settings {
            clipboard_size_limit: limit,
            markdown_only_fallback: fallback,
            ..Settings::default()
        };
        ClipboardSizeGuard::new(SettingsStore::new(settings))
    }

    #[test]
    fn test_zero_limit_disables_enforcement() {
        let guard = guard_with(0, false);
        let verdict = guard
            .ensure_within_limits(vec![image_of_size(10_000_000)])
            .unwrap();
        assert!(verdict.allow);
        assert!(verdict.warnings.is_empty());
        assert_eq!(verdict.images.len(), 1);
    }

    #[test]
    fn test_empty_image_list_passes() {
        let guard = guard_with(5, false);
        let verdict = guard.ensure_within_limits(Vec::new()).unwrap();
        assert!(verdict.allow);
        assert!(verdict.warnings.is_empty());
    }

    #[test]
    fn test_within_budget_passes() {
        let guard = guard_with(100, false);
        let verdict = guard
            .ensure_within_limits(vec![image_of_size(40), image_of_size(60)])
            .unwrap();
        assert!(verdict.allow);
        assert!(verdict.warnings.is_empty());
        assert_eq!(verdict.images.len(), 2);
    }

    #[test]
    fn test_over_budget_without_fallback_rejects() {
        let guard = guard_with(5, false);
        let verdict = guard.ensure_within_limits(vec![image_of_size(10)]).unwrap();

        assert!(!verdict.allow);
        assert_eq!(verdict.images.len(), 1);
        assert_eq!(verdict.warnings.len(), 1);
        assert!(verdict.warnings[0].contains("exceeds limit"));
        assert_eq!(
            verdict.warnings[0],
            "Clipboard payload 10 B exceeds limit 5 B. Adjust settings or reduce image size."
        );
    }

    #[test]
    fn test_over_budget_with_fallback_strips_images() {
        let guard = guard_with(5, true);
        let verdict = guard.ensure_within_limits(vec![image_of_size(10)]).unwrap();

        assert!(verdict.allow);
        assert!(verdict.images.is_empty());
        assert_eq!(verdict.warnings.len(), 1);
        assert!(verdict.warnings[0].contains("Images skipped"));
        assert_eq!(
            verdict.warnings[0],
            "Images skipped: payload 10 B exceeds limit 5 B. Markdown content copied instead."
        );
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
        assert_eq!(format_bytes(2 * 1024 * 1024 * 1024), "2.0 GB");
    }
}
