//! sherpa-onnx metadata patching for Piper voices
//!
//! Piper VITS models published on HuggingFace keep their settings in the
//! companion `.onnx.json` file only. sherpa-onnx reads them from the ONNX
//! `metadata_props` table instead and crashes in native code when required
//! keys are absent. This library derives the expected metadata from the
//! config and appends whatever the model is missing, never overwriting an
//! existing entry.

pub mod config;
pub mod error;
pub mod language;
pub mod metadata;
pub mod model;
pub mod patch;

use std::path::{Path, PathBuf};

pub use config::VoiceConfig;
pub use error::{ConfigError, ModelError, PatchError, Result};
pub use language::{LanguageVoice, derive_language_and_voice};
pub use metadata::{DerivedMetadata, MetadataKey, MetadataMap, Severity};
pub use model::{ModelLoader, ModelMetadata, OnnxLoader, OnnxModel};
pub use patch::{AddedEntry, PatchOutcome, PatchPlan};

/// State gathered before any write: the loaded model, the target metadata
/// and which keys are missing.
pub struct Inspection<M> {
    pub model_path: PathBuf,
    pub derived: DerivedMetadata,
    pub existing: MetadataMap,
    pub plan: PatchPlan,
    model: M,
}

/// Drives one model/config pair through load, diff and patch
pub struct MetadataPatcher<L = OnnxLoader> {
    loader: L,
    dry_run: bool,
}

impl MetadataPatcher<OnnxLoader> {
    /// Patcher backed by the ONNX container
    pub fn onnx() -> Self {
        Self::new(OnnxLoader)
    }
}

impl<L: ModelLoader> MetadataPatcher<L> {
    /// Create new patcher
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            dry_run: false,
        }
    }

    /// Compute and report changes without saving the model
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Read the config and model and work out what is missing
    pub fn inspect(&self, model_path: &Path, config_path: &Path) -> Result<Inspection<L::Model>> {
        let config = VoiceConfig::load(config_path)?;
        let derived = DerivedMetadata::derive(model_path, &config);

        let model = self.loader.load(model_path)?;
        let existing = model.metadata();
        let plan = PatchPlan::new(&derived, &existing);

        tracing::debug!(
            model = %model_path.display(),
            existing = existing.len(),
            missing = plan.missing().len(),
            "Inspected model metadata"
        );

        Ok(Inspection {
            model_path: model_path.to_path_buf(),
            derived,
            existing,
            plan,
            model,
        })
    }

    /// Append every missing entry and save once
    ///
    /// Keys already in the model are left alone even when their value
    /// differs from the derived one. Nothing is written when the plan is
    /// empty or in dry-run mode.
    pub fn apply(&self, inspection: Inspection<L::Model>) -> Result<PatchOutcome> {
        let Inspection {
            model_path,
            derived,
            existing,
            plan,
            mut model,
        } = inspection;

        if plan.is_empty() {
            tracing::info!(model = %model_path.display(), "Model already has all metadata");
            return Ok(PatchOutcome::AlreadyComplete);
        }

        let entries = plan.entries(&derived);
        debug_assert!(entries.iter().all(|e| !existing.contains_key(e.key.as_str())));

        if self.dry_run {
            tracing::info!(model = %model_path.display(), count = entries.len(), "Dry run, model not saved");
            return Ok(PatchOutcome::DryRun { would_add: entries });
        }

        for entry in &entries {
            model.append_metadata(entry.key.as_str(), &entry.value);
        }
        model.save(&model_path)?;

        tracing::info!(model = %model_path.display(), count = entries.len(), "Patched model metadata");
        Ok(PatchOutcome::Patched { added: entries })
    }

    /// Inspect then apply
    pub fn run(&self, model_path: &Path, config_path: &Path) -> Result<PatchOutcome> {
        let inspection = self.inspect(model_path, config_path)?;
        self.apply(inspection)
    }
}
