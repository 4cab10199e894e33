//! Markdown rendering for the rendered copy mode

use crate::pipeline::services::MarkdownRenderer;
use comrak::{markdown_to_html, Options};

/// Renderer backed by comrak with the common extension set.
///
/// Raw HTML stays disabled: image tags are injected by the composer after
/// rendering, and untrusted note content must not smuggle markup into the
/// clipboard document.
pub struct ComrakRenderer;

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, markdown: &str, _source_path: Option<&str>) -> String {
        let mut options = Options::default();

        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.header_ids = Some(String::new());

        markdown_to_html(markdown, &options)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_basic_markdown() {
        let html = ComrakRenderer.render("# Hello\n\n**World**", None);
        assert!(html.contains("<h1"));
        assert!(html.contains("<strong>World</strong>"));
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = ComrakRenderer.render("before <img src=\"x\"> after", None);
        assert!(!html.contains("<img src=\"x\">"));
    }

    #[test]
    fn test_alphanumeric_tokens_pass_through_verbatim() {
        let html = ComrakRenderer.render("see EMBEDTOKEN0X here", None);
        assert!(html.contains("EMBEDTOKEN0X"));
    }
}
