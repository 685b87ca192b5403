//! Command-line interface for ensure-model-metadata
//!
//! Structured logs go to stderr through tracing; the patch report goes to
//! stdout in the selected format.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use console::{Term, style};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use piper_metadata::patch::{KeyList, format_entries, format_keys};
use piper_metadata::{AddedEntry, MetadataPatcher, PatchOutcome};

/// Ensure a Piper ONNX voice carries the metadata sherpa-onnx needs
#[derive(Parser, Debug)]
#[command(
    name = "ensure-model-metadata",
    version = env!("CARGO_PKG_VERSION"),
    about = "Patch missing sherpa-onnx metadata into a Piper ONNX model",
    long_about = "Reads the companion .onnx.json config, derives sample_rate, n_speakers, \
                  language, voice and the other keys sherpa-onnx expects, and appends the \
                  missing ones to the model. Existing keys are never changed; a model that \
                  already has every key is not rewritten."
)]
pub struct Cli {
    /// ONNX model to patch in place
    pub model: PathBuf,

    /// Companion voice configuration (`<model>.onnx.json`)
    pub config: PathBuf,

    /// Report what would be added without writing the model
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (suppress non-error messages)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for machine processing
    Json,
    /// Plain output for CI logs
    Compact,
}

/// Machine-readable summary of one run
#[derive(Debug, Serialize)]
struct Report<'a> {
    model: &'a Path,
    status: &'static str,
    missing_required: KeyList,
    missing_recommended: KeyList,
    added: &'a [AddedEntry],
}

/// CLI application runner
pub struct CliRunner {
    args: Cli,
    term: Term,
}

impl CliRunner {
    /// Create new CLI runner
    pub fn new(args: Cli) -> Self {
        Self {
            args,
            term: Term::stdout(),
        }
    }

    /// Initialize logging and tracing
    pub fn init_logging(&self) {
        let level = if self.args.quiet {
            LevelFilter::ERROR
        } else if self.args.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        };

        let filter = EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();

        // A subscriber may already be installed when embedded in tests.
        let _ = match self.args.format {
            OutputFormat::Human => tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init(),
            OutputFormat::Json => tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .try_init(),
            OutputFormat::Compact => tracing_subscriber::registry()
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .with(filter)
                .try_init(),
        };
    }

    /// Run CLI application
    pub fn run(&self) -> anyhow::Result<()> {
        self.init_logging();

        debug!("Starting ensure-model-metadata v{}", env!("CARGO_PKG_VERSION"));

        let model = self.args.model.clone();
        let patcher = MetadataPatcher::onnx().dry_run(self.args.dry_run);

        let inspection = patcher
            .inspect(&model, &self.args.config)
            .with_context(|| format!("Failed to inspect {}", model.display()))?;

        let missing_required = inspection.plan.missing_required();
        let missing_recommended = inspection.plan.missing_recommended();

        if inspection.plan.is_empty() {
            return self.output_complete(&model);
        }

        if self.args.format != OutputFormat::Json {
            for (message, msg_type) in missing_lines(&missing_required, &missing_recommended) {
                self.output_message(&message, msg_type);
            }
        }

        let outcome = patcher
            .apply(inspection)
            .with_context(|| format!("Failed to patch {}", model.display()))?;

        if self.args.format == OutputFormat::Json {
            let report = Report {
                model: &model,
                status: outcome.status(),
                missing_required,
                missing_recommended,
                added: outcome.entries(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        let (message, msg_type) = outcome_line(&model, &outcome);
        self.output_message(&message, msg_type);

        Ok(())
    }

    /// Report a model that needed nothing
    fn output_complete(&self, model: &Path) -> anyhow::Result<()> {
        if self.args.format == OutputFormat::Json {
            let report = Report {
                model,
                status: PatchOutcome::AlreadyComplete.status(),
                missing_required: KeyList::new(),
                missing_recommended: KeyList::new(),
                added: &[],
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            self.output_message(
                &format!("OK: {} has all metadata", model.display()),
                MessageType::Success,
            );
        }
        Ok(())
    }

    /// Output message with formatting
    fn output_message(&self, message: &str, msg_type: MessageType) {
        if self.args.quiet {
            return;
        }

        match self.args.format {
            OutputFormat::Human => {
                let styled_message = match msg_type {
                    MessageType::Success => style(message).green(),
                    MessageType::Warning => style(message).yellow(),
                    MessageType::Info => style(message).blue(),
                };

                let _ = self.term.write_line(&styled_message.to_string());
            }
            OutputFormat::Json | OutputFormat::Compact => {
                println!("{message}");
            }
        }
    }
}

/// Warning lines listing missing keys by severity
fn missing_lines(required: &KeyList, recommended: &KeyList) -> Vec<(String, MessageType)> {
    let mut lines = Vec::with_capacity(2);
    if !required.is_empty() {
        lines.push((
            format!("Missing REQUIRED metadata: {}", format_keys(required)),
            MessageType::Warning,
        ));
    }
    if !recommended.is_empty() {
        lines.push((
            format!("Missing recommended metadata: {}", format_keys(recommended)),
            MessageType::Warning,
        ));
    }
    lines
}

/// Final status line for a patch outcome
fn outcome_line(model: &Path, outcome: &PatchOutcome) -> (String, MessageType) {
    match outcome {
        PatchOutcome::AlreadyComplete => (
            format!("OK: {} already has all metadata", model.display()),
            MessageType::Success,
        ),
        PatchOutcome::Patched { added } => (
            format!(
                "PATCHED: Added metadata to {}: {}",
                model.display(),
                format_entries(added)
            ),
            MessageType::Success,
        ),
        PatchOutcome::DryRun { would_add } => (
            format!(
                "DRY RUN: Would add metadata to {}: {}",
                model.display(),
                format_entries(would_add)
            ),
            MessageType::Info,
        ),
    }
}

/// Message types for output formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageType {
    Success,
    Warning,
    Info,
}
