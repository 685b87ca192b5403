//! Missing-key computation and the patch outcome

use serde::Serialize;
use smallvec::SmallVec;

use crate::metadata::{DerivedMetadata, MetadataKey, MetadataMap, Severity};

/// Keys absent from a model, at most one of each [`MetadataKey`]
pub type KeyList = SmallVec<[MetadataKey; 9]>;

/// A metadata entry scheduled for (or already) written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedEntry {
    pub key: MetadataKey,
    pub value: String,
}

impl std::fmt::Display for AddedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Target keys not yet present in the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    missing: KeyList,
}

impl PatchPlan {
    /// Set difference of derived keys minus existing keys, in canonical order
    pub fn new(derived: &DerivedMetadata, existing: &MetadataMap) -> Self {
        let missing = derived
            .iter()
            .map(|(key, _)| key)
            .filter(|key| !existing.contains_key(key.as_str()))
            .collect();
        Self { missing }
    }

    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn missing(&self) -> &[MetadataKey] {
        &self.missing
    }

    /// Missing keys that crash the native loader
    pub fn missing_required(&self) -> KeyList {
        self.with_severity(Severity::Required)
    }

    /// Missing keys that only affect behavior
    pub fn missing_recommended(&self) -> KeyList {
        self.with_severity(Severity::Recommended)
    }

    fn with_severity(&self, severity: Severity) -> KeyList {
        self.missing
            .iter()
            .copied()
            .filter(|key| key.severity() == severity)
            .collect()
    }

    /// Entries to append, with their derived values
    pub fn entries(&self, derived: &DerivedMetadata) -> Vec<AddedEntry> {
        self.missing
            .iter()
            .map(|&key| AddedEntry {
                key,
                value: derived.get(key).to_string(),
            })
            .collect()
    }
}

/// What a patch run did to the model file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Every target key was already present; the file was not touched
    AlreadyComplete,
    /// Missing entries were appended and the file saved once
    Patched { added: Vec<AddedEntry> },
    /// Missing entries were computed but not written
    DryRun { would_add: Vec<AddedEntry> },
}

impl PatchOutcome {
    pub fn entries(&self) -> &[AddedEntry] {
        match self {
            PatchOutcome::AlreadyComplete => &[],
            PatchOutcome::Patched { added } => added,
            PatchOutcome::DryRun { would_add } => would_add,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            PatchOutcome::AlreadyComplete => "ok",
            PatchOutcome::Patched { .. } => "patched",
            PatchOutcome::DryRun { .. } => "dry-run",
        }
    }
}

/// `k1=v1, k2=v2` for report lines
pub fn format_entries(entries: &[AddedEntry]) -> String {
    entries
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `k1, k2` for report lines
pub fn format_keys(keys: &[MetadataKey]) -> String {
    keys.iter()
        .map(|key| key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VoiceConfig;
    use std::path::Path;

    fn derived() -> DerivedMetadata {
        DerivedMetadata::derive(
            Path::new("voices/en_US-amy-medium.onnx"),
            &VoiceConfig::default(),
        )
    }

    fn existing(entries: &[(&str, &str)]) -> MetadataMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_model_misses_everything() {
        let plan = PatchPlan::new(&derived(), &MetadataMap::new());
        assert_eq!(plan.missing(), &MetadataKey::ALL[..]);
        assert_eq!(plan.missing_required().len(), 6);
        assert_eq!(plan.missing_recommended().len(), 3);
    }

    #[test]
    fn complete_model_needs_nothing() {
        let all: Vec<_> = MetadataKey::ALL.iter().map(|k| (k.as_str(), "x")).collect();
        let plan = PatchPlan::new(&derived(), &existing(&all));
        assert!(plan.is_empty());
        assert!(plan.entries(&derived()).is_empty());
    }

    #[test]
    fn partition_by_severity() {
        let plan = PatchPlan::new(
            &derived(),
            &existing(&[
                ("sample_rate", "1"),
                ("n_speakers", "1"),
                ("language", "English"),
                ("comment", "piper"),
                ("frontend", "espeak"),
                ("unrelated", "kept"),
            ]),
        );

        assert_eq!(
            plan.missing_required().as_slice(),
            &[MetadataKey::HasEspeak, MetadataKey::Voice]
        );
        assert_eq!(
            plan.missing_recommended().as_slice(),
            &[MetadataKey::AddBlank, MetadataKey::ModelType]
        );
        assert_eq!(format_keys(&plan.missing_required()), "has_espeak, voice");
    }

    #[test]
    fn entries_carry_derived_values() {
        let derived = derived();
        let plan = PatchPlan::new(
            &derived,
            &existing(&[
                ("sample_rate", "1"),
                ("n_speakers", "1"),
                ("language", "English"),
                ("comment", "piper"),
                ("has_espeak", "1"),
                ("add_blank", "1"),
                ("frontend", "espeak"),
            ]),
        );

        let entries = plan.entries(&derived);
        assert_eq!(format_entries(&entries), "voice=en-us, model_type=vits");
    }

    #[test]
    fn outcome_exposes_entries() {
        let added = vec![AddedEntry {
            key: MetadataKey::Comment,
            value: "piper".to_string(),
        }];
        assert!(PatchOutcome::AlreadyComplete.entries().is_empty());
        assert_eq!(PatchOutcome::Patched { added: added.clone() }.entries(), &added[..]);
        assert_eq!(PatchOutcome::DryRun { would_add: added }.status(), "dry-run");
    }
}
