//! The copy command orchestrator
//!
//! Sequences the pipeline stages — selection, embed resolution, encoding,
//! size guard, composition, clipboard write — and aggregates every stage's
//! warnings into a single notification. Partial failures degrade; only
//! selection read, composition, and clipboard write failures abort with an
//! error notice.

use crate::error::Result;
use crate::notice::{NoticePresenter, NoticeSession};
use crate::pipeline::services::{
    ClipboardComposer, ClipboardGuard, ClipboardWriter, EmbedResolver, ImageEncoder,
    SelectionSource,
};
use crate::pipeline::types::{EncodedImage, ResolvedEmbed};
use log::debug;

/// How a command run ended; `Failed` is the only non-zero exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Clean run, clipboard written.
    Copied,
    /// Clipboard written, but with accumulated warnings.
    CopiedWithWarnings,
    /// Nothing to do or guard refusal; clipboard untouched.
    Skipped,
    /// Abort error; clipboard untouched (or write itself failed).
    Failed,
}

/// Orchestrates one copy run over injected host adapters.
pub struct CopyCommand {
    selection_source: Box<dyn SelectionSource>,
    embed_resolver: Box<dyn EmbedResolver>,
    image_encoder: Box<dyn ImageEncoder>,
    composer: Box<dyn ClipboardComposer>,
    writer: Box<dyn ClipboardWriter>,
    guard: Box<dyn ClipboardGuard>,
}

impl CopyCommand {
    pub fn new(
        selection_source: Box<dyn SelectionSource>,
        embed_resolver: Box<dyn EmbedResolver>,
        image_encoder: Box<dyn ImageEncoder>,
        composer: Box<dyn ClipboardComposer>,
        writer: Box<dyn ClipboardWriter>,
        guard: Box<dyn ClipboardGuard>,
    ) -> Self {
        CopyCommand {
            selection_source,
            embed_resolver,
            image_encoder,
            composer,
            writer,
            guard,
        }
    }

    /// Run the pipeline once. Exactly one notification is flushed through
    /// the presenter, whatever happens.
    pub fn execute(&self, presenter: &dyn NoticePresenter) -> CopyOutcome {
        let mut session = NoticeSession::new(presenter);

        let selection = match self.selection_source.active_selection() {
            Ok(selection) => selection,
            Err(error) => {
                session.error(format!("Failed to read selection: {}", error));
                session.flush();
                return CopyOutcome::Failed;
            }
        };

        let Some(selection) = selection else {
            session.warn("Nothing selected to copy.");
            session.flush();
            return CopyOutcome::Skipped;
        };

        debug!(
            "copying {} bytes of markdown (embeds: {})",
            selection.markdown.len(),
            selection.contains_embeds
        );

        let mut warnings: Vec<String> = Vec::new();
        let mut embeds: Vec<ResolvedEmbed> = Vec::new();

        match self
            .embed_resolver
            .collect_embeds(&selection.markdown, selection.source_path.as_deref())
        {
            Ok(resolution) => {
                embeds = resolution.embeds;
                for warning in resolution.warnings {
                    session.warn(warning.clone());
                    warnings.push(warning);
                }
            }
            Err(error) => {
                // Degraded, not fatal: carry on with zero embeds.
                let message = format!("Unable to resolve embeds: {}", error);
                session.warn(message.clone());
                warnings.push(message);
            }
        }

        let mut encoded_images: Vec<EncodedImage> = Vec::new();
        for embed in &embeds {
            match self.image_encoder.encode(embed) {
                Ok(encoded) => encoded_images.push(encoded),
                Err(error) => {
                    let message =
                        format!("Failed to encode {}: {}", embed.original_link, error);
                    session.warn(message.clone());
                    warnings.push(message);
                }
            }
        }

        let encoded_images = match self.guard.ensure_within_limits(encoded_images) {
            Ok(verdict) => {
                for warning in &verdict.warnings {
                    session.warn(warning.clone());
                    warnings.push(warning.clone());
                }
                if !verdict.allow {
                    session.flush();
                    return CopyOutcome::Skipped;
                }
                verdict.images
            }
            Err(error) => {
                let message = error.to_string();
                session.warn(message.clone());
                warnings.push(message);
                session.flush();
                return CopyOutcome::Skipped;
            }
        };

        let mut payload = match self.composer.compose(&selection, &embeds, encoded_images) {
            Ok(payload) => payload,
            Err(error) => {
                session.error(format!("Failed to compose clipboard payload: {}", error));
                session.flush();
                return CopyOutcome::Failed;
            }
        };

        payload.warnings.extend(warnings);

        if let Err(error) = self.writer.write(&payload) {
            session.error(format!("Clipboard write failed: {}", error));
            session.flush();
            return CopyOutcome::Failed;
        }

        if !payload.warnings.is_empty() {
            for warning in &payload.warnings {
                session.warn(warning.clone());
            }
            session.flush();
            return CopyOutcome::CopiedWithWarnings;
        }

        session.success("Selection copied for article paste.");
        session.flush();
        CopyOutcome::Copied
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
