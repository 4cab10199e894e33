//! Clipboard payload composition
//!
//! Rewrites the selection markdown into the final clipboard payload: an
//! untouched plain-text copy plus an HTML document with embeds replaced by
//! inline images. Two body renderings exist, selected by `CopyFormat`:
//! escaped markdown source, or markdown rendered to HTML through an external
//! renderer. Both share one ledger for image consumption and warning
//! bookkeeping, so duplicate links, missing images, and unused images are
//! accounted identically in either mode.

use crate::config::{CopyFormat, SettingsStore};
use crate::error::Result;
use crate::pipeline::services::{ClipboardComposer, MarkdownRenderer};
use crate::pipeline::types::{ClipboardPayload, EncodedImage, ResolvedEmbed, SelectionSnapshot};
use crate::pipeline::EMBED_SCAN_PATTERN;
use regex::Regex;
use std::collections::{HashMap, HashSet, VecDeque};

// ─────────────────────────────────────────────────────────────────────────────
// HTML Escaping
// ─────────────────────────────────────────────────────────────────────────────

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Escape a plain-text segment and convert line breaks.
fn format_plain_segment(segment: &str) -> String {
    escape_html(segment)
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

fn build_image_tag(image: &EncodedImage) -> String {
    format!(
        "<img src=\"{}\" data-path=\"{}\" alt=\"{}\">",
        image.data_uri,
        escape_attribute(&image.original.file.path),
        escape_attribute(&image.original.original_link)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Embed Ledger
// ─────────────────────────────────────────────────────────────────────────────

/// Shared per-segment bookkeeping for both rendering modes.
///
/// Images are bucketed by original link as FIFO queues, so when the same
/// embed text occurs twice the first occurrence consumes the first encoded
/// image. Occurrences of links that were resolved but have no image left
/// warn; occurrences the resolver never produced an embed for stay silent
/// (the resolver already warned once).
struct EmbedLedger<'a> {
    images: &'a [EncodedImage],
    buckets: HashMap<&'a str, VecDeque<usize>>,
    resolved: HashSet<&'a str>,
    consumed: Vec<bool>,
    warnings: Vec<String>,
}

impl<'a> EmbedLedger<'a> {
    fn new(embeds: &'a [ResolvedEmbed], images: &'a [EncodedImage]) -> Self {
        let mut buckets: HashMap<&str, VecDeque<usize>> = HashMap::new();
        for (index, image) in images.iter().enumerate() {
            buckets
                .entry(image.original.original_link.as_str())
                .or_default()
                .push_back(index);
        }

        EmbedLedger {
            images,
            buckets,
            resolved: embeds
                .iter()
                .map(|embed| embed.original_link.as_str())
                .collect(),
            consumed: vec![false; images.len()],
            warnings: Vec::new(),
        }
    }

    /// Consume the next queued image for an embed occurrence, if any.
    fn take(&mut self, original: &str) -> Option<&'a EncodedImage> {
        if let Some(bucket) = self.buckets.get_mut(original) {
            if let Some(index) = bucket.pop_front() {
                self.consumed[index] = true;
                return Some(&self.images[index]);
            }
        }
        if self.resolved.contains(original) {
            self.warnings
                .push(format!("No encoded image available for {}", original));
        }
        None
    }

    /// Close the ledger: one warning per image that was never consumed.
    fn finish(mut self) -> Vec<String> {
        for (index, image) in self.images.iter().enumerate() {
            if !self.consumed[index] {
                self.warnings.push(format!(
                    "Unused encoded image for {}",
                    image.original.original_link
                ));
            }
        }
        self.warnings
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Segmentation
// ─────────────────────────────────────────────────────────────────────────────

/// One piece of the selection: literal text or an embed occurrence.
enum Segment<'a> {
    Text(&'a str),
    Embed(&'a str),
}

// ─────────────────────────────────────────────────────────────────────────────
// Composer
// ─────────────────────────────────────────────────────────────────────────────

/// Composes the clipboard payload, reading the copy format fresh per call.
pub struct HtmlClipboardComposer {
    settings: SettingsStore,
    renderer: Box<dyn MarkdownRenderer>,
    embed_pattern: Regex,
}

impl HtmlClipboardComposer {
    pub fn new(settings: SettingsStore, renderer: Box<dyn MarkdownRenderer>) -> Self {
        HtmlClipboardComposer {
            settings,
            renderer,
            embed_pattern: Regex::new(EMBED_SCAN_PATTERN).expect("valid embed pattern"),
        }
    }

    /// Split the markdown into an alternating segment sequence covering the
    /// whole string with no gaps.
    fn segment<'a>(&self, markdown: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut cursor = 0;

        for found in self.embed_pattern.find_iter(markdown) {
            if found.start() > cursor {
                segments.push(Segment::Text(&markdown[cursor..found.start()]));
            }
            segments.push(Segment::Embed(found.as_str()));
            cursor = found.end();
        }
        if cursor < markdown.len() {
            segments.push(Segment::Text(&markdown[cursor..]));
        }

        segments
    }

    /// Escaped mode: the markdown source stays visible, HTML-escaped, with
    /// embeds swapped for image tags where one is available.
    fn compose_escaped(&self, markdown: &str, ledger: &mut EmbedLedger) -> String {
        let mut body = String::new();
        for segment in self.segment(markdown) {
            match segment {
                Segment::Text(text) => body.push_str(&format_plain_segment(text)),
                Segment::Embed(original) => match ledger.take(original) {
                    Some(image) => body.push_str(&build_image_tag(image)),
                    None => body.push_str(&format_plain_segment(original)),
                },
            }
        }
        body
    }

    /// Rendered mode: the renderer sees the markdown with embeds-with-images
    /// replaced by opaque tokens, and the tokens are swapped for image tags
    /// afterwards. The renderer cannot be trusted to pass raw HTML through
    /// untouched, hence the indirection. Embeds without an image are left for
    /// the renderer to handle as ordinary markdown.
    fn compose_rendered(
        &self,
        markdown: &str,
        source_path: Option<&str>,
        ledger: &mut EmbedLedger,
    ) -> String {
        let prefix = placeholder_prefix(markdown);
        let mut working = String::new();
        let mut substitutions: Vec<(String, String)> = Vec::new();

        for segment in self.segment(markdown) {
            match segment {
                Segment::Text(text) => working.push_str(text),
                Segment::Embed(original) => match ledger.take(original) {
                    Some(image) => {
                        let token = format!("{}{}X", prefix, substitutions.len());
                        substitutions.push((token.clone(), build_image_tag(image)));
                        working.push_str(&token);
                    }
                    None => working.push_str(original),
                },
            }
        }

        let mut html = self.renderer.render(&working, source_path);
        for (token, tag) in substitutions {
            html = html.replacen(&token, &tag, 1);
        }
        html
    }
}

impl ClipboardComposer for HtmlClipboardComposer {
    fn compose(
        &self,
        selection: &SelectionSnapshot,
        embeds: &[ResolvedEmbed],
        encoded_images: Vec<EncodedImage>,
    ) -> Result<ClipboardPayload> {
        let copy_format = self.settings.get().copy_format;
        let markdown = &selection.markdown;

        let mut ledger = EmbedLedger::new(embeds, &encoded_images);
        let body = match copy_format {
            CopyFormat::Markdown => self.compose_escaped(markdown, &mut ledger),
            CopyFormat::Html => {
                self.compose_rendered(markdown, selection.source_path.as_deref(), &mut ledger)
            }
        };
        let warnings = ledger.finish();

        let attributes = match selection.source_path.as_deref() {
            Some(path) => format!(" data-source-path=\"{}\"", escape_attribute(path)),
            None => String::new(),
        };
        let html = format!(
            "<!DOCTYPE html><html><body><div{}>{}</div></body></html>",
            attributes, body
        );

        Ok(ClipboardPayload {
            text: markdown.clone(),
            html,
            images: encoded_images,
            warnings,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Placeholder Tokens
// ─────────────────────────────────────────────────────────────────────────────

/// Pick a token prefix that does not occur in the source markdown.
///
/// Tokens are `{prefix}{counter}X`; the trailing terminator keeps token 1
/// from being a prefix of token 11. Alphanumeric-only text survives any
/// sane markdown renderer verbatim.
fn placeholder_prefix(markdown: &str) -> String {
    let mut prefix = String::from("EMBEDTOKEN");
    while markdown.contains(&prefix) {
        prefix.push('Q');
    }
    prefix
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::vault::VaultFile;
    use std::path::PathBuf;

    /// Deterministic renderer stub: wraps input so tests can see exactly
    /// what reached the renderer.
    struct ParagraphRenderer;

    impl MarkdownRenderer for ParagraphRenderer {
        fn render(&self, markdown: &str, _source_path: Option<&str>) -> String {
            format!("<p>{}</p>\n", markdown.trim_end())
        }
    }

    fn composer_with(format: CopyFormat) -> HtmlClipboardComposer {
        let settings = Settings {
            copy_format: format,
            ..Settings::default()
        };
        HtmlClipboardComposer::new(SettingsStore::new(settings), Box::new(ParagraphRenderer))
    }

    fn selection(markdown: &str) -> SelectionSnapshot {
        SelectionSnapshot {
            markdown: markdown.to_string(),
            source_path: Some("notes/post.md".to_string()),
            contains_embeds: true,
        }
    }

    fn embed(original_link: &str) -> ResolvedEmbed {
        ResolvedEmbed {
            original_link: original_link.to_string(),
            file: VaultFile {
                path: "media/photo.png".to_string(),
                abs_path: PathBuf::from("/vault/media/photo.png"),
                extension: "png".to_string(),
            },
            buffer: vec![1, 2, 3],
            mime_type: "image/png",
            size_bytes: 3,
        }
    }

    fn encoded(original_link: &str, data_uri: &str) -> EncodedImage {
        EncodedImage {
            data_uri: data_uri.to_string(),
            bitmap: None,
            size_bytes: 3,
            mime_type: "image/png",
            original: embed(original_link),
        }
    }

    #[test]
    fn test_no_embeds_no_img_tags_no_warnings() {
        let composer = composer_with(CopyFormat::Markdown);
        let payload = composer
            .compose(&selection("just *text* here"), &[], Vec::new())
            .unwrap();

        assert!(!payload.html.contains("<img"));
        assert!(payload.warnings.is_empty());
        assert_eq!(payload.text, "just *text* here");
    }

    #[test]
    fn test_embed_replaced_by_exactly_one_img_tag() {
        let composer = composer_with(CopyFormat::Markdown);
        let link = "![[photo.png]]";
        let payload = composer
            .compose(
                &selection("before ![[photo.png]] after"),
                &[embed(link)],
                vec![encoded(link, "data:image/png;base64,AAAA")],
            )
            .unwrap();

        assert_eq!(payload.html.matches("<img").count(), 1);
        assert!(payload
            .html
            .contains("src=\"data:image/png;base64,AAAA\""));
        assert!(payload.html.contains("data-path=\"media/photo.png\""));
        assert!(payload.html.contains("alt=\"![[photo.png]]\""));
        assert!(payload.warnings.is_empty());
    }

    #[test]
    fn test_resolved_but_unencoded_embed_warns_and_stays_literal() {
        let composer = composer_with(CopyFormat::Markdown);
        let payload = composer
            .compose(
                &selection("![[missing.png]]"),
                &[embed("![[missing.png]]")],
                Vec::new(),
            )
            .unwrap();

        assert!(payload.html.contains("![[missing.png]]"));
        assert_eq!(
            payload.warnings,
            vec!["No encoded image available for ![[missing.png]]"]
        );
    }

    #[test]
    fn test_never_resolved_embed_stays_silent() {
        let composer = composer_with(CopyFormat::Markdown);
        let payload = composer
            .compose(&selection("![[external.png]]"), &[], Vec::new())
            .unwrap();

        assert!(payload.html.contains("![[external.png]]"));
        assert!(payload.warnings.is_empty());
    }

    #[test]
    fn test_unused_image_warns_once() {
        let composer = composer_with(CopyFormat::Markdown);
        let link = "![[photo.png]]";
        let payload = composer
            .compose(
                &selection("no embeds in this text"),
                &[embed(link)],
                vec![encoded(link, "data:image/png;base64,AAAA")],
            )
            .unwrap();

        assert!(!payload.html.contains("<img"));
        assert_eq!(
            payload.warnings,
            vec!["Unused encoded image for ![[photo.png]]"]
        );
        // The full image list still travels with the payload.
        assert_eq!(payload.images.len(), 1);
    }

    #[test]
    fn test_duplicate_links_consume_in_order() {
        let composer = composer_with(CopyFormat::Markdown);
        let link = "![[photo.png]]";
        let payload = composer
            .compose(
                &selection("![[photo.png]] and ![[photo.png]]"),
                &[embed(link), embed(link)],
                vec![
                    encoded(link, "data:image/png;base64,FIRST"),
                    encoded(link, "data:image/png;base64,SECOND"),
                ],
            )
            .unwrap();

        let first = payload.html.find("FIRST").unwrap();
        let second = payload.html.find("SECOND").unwrap();
        assert!(first < second);
        assert!(payload.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_occurrence_without_second_image_warns() {
        let composer = composer_with(CopyFormat::Markdown);
        let link = "![[photo.png]]";
        let payload = composer
            .compose(
                &selection("![[photo.png]] and ![[photo.png]]"),
                &[embed(link), embed(link)],
                vec![encoded(link, "data:image/png;base64,ONLY")],
            )
            .unwrap();

        assert_eq!(payload.html.matches("<img").count(), 1);
        assert_eq!(
            payload.warnings,
            vec!["No encoded image available for ![[photo.png]]"]
        );
    }

    #[test]
    fn test_escaped_mode_escapes_text_and_breaks_lines() {
        let composer = composer_with(CopyFormat::Markdown);
        let payload = composer
            .compose(&selection("a < b\nc & d"), &[], Vec::new())
            .unwrap();

        assert!(payload.html.contains("a &lt; b<br>c &amp; d"));
        assert_eq!(payload.text, "a < b\nc & d");
    }

    #[test]
    fn test_wrapper_and_source_path_attribute() {
        let composer = composer_with(CopyFormat::Markdown);
        let payload = composer.compose(&selection("x"), &[], Vec::new()).unwrap();
        assert!(payload.html.starts_with(
            "<!DOCTYPE html><html><body><div data-source-path=\"notes/post.md\">"
        ));
        assert!(payload.html.ends_with("</div></body></html>"));

        let anonymous = SelectionSnapshot {
            markdown: "x".to_string(),
            source_path: None,
            contains_embeds: false,
        };
        let payload = composer.compose(&anonymous, &[], Vec::new()).unwrap();
        assert!(payload.html.contains("<div>x</div>"));
    }

    #[test]
    fn test_rendered_mode_substitutes_after_rendering() {
        let composer = composer_with(CopyFormat::Html);
        let link = "![[photo.png]]";
        let payload = composer
            .compose(
                &selection("intro ![[photo.png]] outro"),
                &[embed(link)],
                vec![encoded(link, "data:image/png;base64,AAAA")],
            )
            .unwrap();

        assert!(payload.html.contains("<img src=\"data:image/png;base64,AAAA\""));
        assert!(!payload.html.contains("EMBEDTOKEN"));
        // Text segments went through the renderer, not the escaper.
        assert!(payload.html.contains("<p>intro "));
    }

    #[test]
    fn test_rendered_mode_leaves_imageless_embeds_to_renderer() {
        let composer = composer_with(CopyFormat::Html);
        let payload = composer
            .compose(
                &selection("![[missing.png]]"),
                &[embed("![[missing.png]]")],
                Vec::new(),
            )
            .unwrap();

        // The embed text reaches the renderer verbatim instead of being
        // HTML-escaped by the composer.
        assert!(payload.html.contains("<p>![[missing.png]]</p>"));
        assert_eq!(
            payload.warnings,
            vec!["No encoded image available for ![[missing.png]]"]
        );
    }

    #[test]
    fn test_rendered_mode_duplicate_images_in_order() {
        let composer = composer_with(CopyFormat::Html);
        let link = "![[photo.png]]";
        let payload = composer
            .compose(
                &selection("![[photo.png]] mid ![[photo.png]]"),
                &[embed(link), embed(link)],
                vec![
                    encoded(link, "data:image/png;base64,FIRST"),
                    encoded(link, "data:image/png;base64,SECOND"),
                ],
            )
            .unwrap();

        let first = payload.html.find("FIRST").unwrap();
        let second = payload.html.find("SECOND").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_text_round_trip_is_verbatim_in_both_modes() {
        let markdown = "# Title\n\n![[photo.png]]\n\ntail";
        for format in [CopyFormat::Markdown, CopyFormat::Html] {
            let composer = composer_with(format);
            let payload = composer
                .compose(&selection(markdown), &[], Vec::new())
                .unwrap();
            assert_eq!(payload.text, markdown);
        }
    }

    #[test]
    fn test_placeholder_prefix_avoids_collisions() {
        assert_eq!(placeholder_prefix("plain text"), "EMBEDTOKEN");
        assert_eq!(placeholder_prefix("has EMBEDTOKEN inside"), "EMBEDTOKENQ");
        assert_eq!(
            placeholder_prefix("EMBEDTOKEN and EMBEDTOKENQ"),
            "EMBEDTOKENQQ"
        );
    }

    #[test]
    fn test_rendered_mode_with_token_lookalike_in_source() {
        let composer = composer_with(CopyFormat::Html);
        let link = "![[photo.png]]";
        let payload = composer
            .compose(
                &selection("EMBEDTOKEN0X ![[photo.png]]"),
                &[embed(link)],
                vec![encoded(link, "data:image/png;base64,AAAA")],
            )
            .unwrap();

        // The literal lookalike survives; the real embed became an image.
        assert!(payload.html.contains("EMBEDTOKEN0X"));
        assert!(payload.html.contains("data:image/png;base64,AAAA"));
    }
}
