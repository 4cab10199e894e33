//! mdclip - Main Entry Point
//!
//! Copies a markdown selection from a vault note to the system clipboard as
//! article-ready HTML, with embedded images resolved, normalized to PNG, and
//! inlined as data URIs.

mod command;
mod config;
mod error;
mod notice;
mod pipeline;
mod vault;

use command::{CopyCommand, CopyOutcome};
use config::{load_config, save_config, CopyFormat, SettingsStore};
use error::{Error, Result};
use log::{debug, info};
use notice::LogNoticePresenter;
use pipeline::{
    ArboardClipboardWriter, ClipboardSizeGuard, ComrakRenderer, FileSelectionSource,
    HtmlClipboardComposer, PngImageEncoder, VaultEmbedResolver,
};
use std::path::PathBuf;
use std::process::ExitCode;
use vault::Vault;

/// Application name constant.
const APP_NAME: &str = "mdclip";

const USAGE: &str = "\
Usage: mdclip [OPTIONS] <NOTE>

Copy a markdown note (or a line range of it) to the clipboard with embedded
images inlined as data URIs.

Arguments:
  <NOTE>                Note file, absolute or relative to the vault root

Options:
      --vault <DIR>     Vault root directory (default: current directory)
      --format <MODE>   Clipboard HTML body: markdown or html
      --limit <BYTES>   Clipboard image budget in bytes, 0 disables the limit
      --no-fallback     Refuse the copy when over budget instead of stripping
                        images
      --lines <A:B>     1-based inclusive line range to copy
      --save-config     Persist the effective settings for future runs
  -h, --help            Print this help";

// ─────────────────────────────────────────────────────────────────────────────
// Command-Line Arguments
// ─────────────────────────────────────────────────────────────────────────────

/// Parsed command-line arguments; overrides apply on top of the persisted
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct CliArgs {
    note: PathBuf,
    vault: Option<PathBuf>,
    format: Option<CopyFormat>,
    limit: Option<u64>,
    no_fallback: bool,
    lines: Option<(usize, usize)>,
    save_config: bool,
    help: bool,
}

impl CliArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
        let mut parsed = CliArgs::default();
        let mut note: Option<PathBuf> = None;
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--vault" => {
                    let value = expect_value(&mut args, "--vault")?;
                    parsed.vault = Some(PathBuf::from(value));
                }
                "--format" => {
                    let value = expect_value(&mut args, "--format")?;
                    parsed.format = Some(CopyFormat::parse(&value).ok_or_else(|| {
                        Error::Application(format!(
                            "Invalid --format '{}': expected 'markdown' or 'html'",
                            value
                        ))
                    })?);
                }
                "--limit" => {
                    let value = expect_value(&mut args, "--limit")?;
                    parsed.limit = Some(value.parse().map_err(|_| {
                        Error::Application(format!(
                            "Invalid --limit '{}': expected a byte count",
                            value
                        ))
                    })?);
                }
                "--no-fallback" => parsed.no_fallback = true,
                "--save-config" => parsed.save_config = true,
                "--lines" => {
                    let value = expect_value(&mut args, "--lines")?;
                    parsed.lines = Some(parse_line_range(&value)?);
                }
                other if other.starts_with('-') => {
                    return Err(Error::Application(format!("Unknown option '{}'", other)));
                }
                _ => {
                    if note.is_some() {
                        return Err(Error::Application(format!(
                            "Unexpected extra argument '{}'",
                            arg
                        )));
                    }
                    note = Some(PathBuf::from(arg));
                }
            }
        }

        if parsed.help {
            return Ok(parsed);
        }

        parsed.note = note.ok_or_else(|| {
            Error::Application("Missing required <NOTE> argument".to_string())
        })?;
        Ok(parsed)
    }
}

fn expect_value(args: &mut impl Iterator<Item = String>, option: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| Error::Application(format!("Option '{}' requires a value", option)))
}

/// Parse a `start:end` line range, 1-based and inclusive.
fn parse_line_range(value: &str) -> Result<(usize, usize)> {
    let invalid = || {
        Error::Application(format!(
            "Invalid --lines '{}': expected 'start:end' with start >= 1",
            value
        ))
    };

    let (start, end) = value.split_once(':').ok_or_else(invalid)?;
    let start: usize = start.trim().parse().map_err(|_| invalid())?;
    let end: usize = end.trim().parse().map_err(|_| invalid())?;
    if start == 0 || end < start {
        return Err(invalid());
    }
    Ok((start, end))
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry Point
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(error) => {
            eprintln!("{}", error);
            eprintln!();
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(CopyOutcome::Failed) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<CopyOutcome> {
    debug!("Starting {}", APP_NAME);

    let mut settings = load_config();
    if let Some(format) = args.format {
        settings.copy_format = format;
    }
    if let Some(limit) = args.limit {
        settings.clipboard_size_limit = limit;
    }
    if args.no_fallback {
        settings.markdown_only_fallback = false;
    }
    settings.sanitize();

    if args.save_config {
        save_config(&settings)?;
    }

    info!(
        "Copy configuration: format {}, limit {} bytes, fallback {}",
        settings.copy_format.display_name(),
        settings.clipboard_size_limit,
        settings.markdown_only_fallback
    );

    let store = SettingsStore::new(settings);

    let vault_root = args
        .vault
        .unwrap_or_else(|| PathBuf::from("."));
    let vault = Vault::open(&vault_root)?;

    let command = CopyCommand::new(
        Box::new(FileSelectionSource::new(
            vault.root().to_path_buf(),
            args.note,
            args.lines,
        )),
        Box::new(VaultEmbedResolver::new(vault)),
        Box::new(PngImageEncoder),
        Box::new(HtmlClipboardComposer::new(
            store.clone(),
            Box::new(ComrakRenderer),
        )),
        Box::new(ArboardClipboardWriter),
        Box::new(ClipboardSizeGuard::new(store)),
    );

    Ok(command.execute(&LogNoticePresenter))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
