//! sherpa-onnx metadata keys and the values derived for a Piper voice

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::config::VoiceConfig;
use crate::language::{LanguageVoice, derive_language_and_voice};

/// Existing metadata read from a model, key to value
pub type MetadataMap = HashMap<String, String>;

/// How badly sherpa-onnx behaves when a key is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The native loader crashes without it
    Required,
    /// Loads, but with wrong defaults
    Recommended,
}

/// Metadata keys written by this tool, in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    SampleRate,
    NSpeakers,
    Language,
    Comment,
    HasEspeak,
    Voice,
    AddBlank,
    Frontend,
    ModelType,
}

impl MetadataKey {
    pub const ALL: [MetadataKey; 9] = [
        MetadataKey::SampleRate,
        MetadataKey::NSpeakers,
        MetadataKey::Language,
        MetadataKey::Comment,
        MetadataKey::HasEspeak,
        MetadataKey::Voice,
        MetadataKey::AddBlank,
        MetadataKey::Frontend,
        MetadataKey::ModelType,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetadataKey::SampleRate => "sample_rate",
            MetadataKey::NSpeakers => "n_speakers",
            MetadataKey::Language => "language",
            MetadataKey::Comment => "comment",
            MetadataKey::HasEspeak => "has_espeak",
            MetadataKey::Voice => "voice",
            MetadataKey::AddBlank => "add_blank",
            MetadataKey::Frontend => "frontend",
            MetadataKey::ModelType => "model_type",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            MetadataKey::SampleRate
            | MetadataKey::NSpeakers
            | MetadataKey::Language
            | MetadataKey::Comment
            | MetadataKey::HasEspeak
            | MetadataKey::Voice => Severity::Required,
            MetadataKey::AddBlank | MetadataKey::Frontend | MetadataKey::ModelType => {
                Severity::Recommended
            }
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target metadata for one model
///
/// Always holds exactly one value per [`MetadataKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedMetadata {
    values: [String; 9],
}

impl DerivedMetadata {
    /// Compute the nine target values from the config and model file name
    pub fn derive(model_path: &Path, config: &VoiceConfig) -> Self {
        let LanguageVoice { language, voice } =
            derive_language_and_voice(model_path, config.language_code.as_deref());

        // Order follows MetadataKey::ALL.
        Self {
            values: [
                config.sample_rate.clone(),
                config.num_speakers.clone(),
                language,
                "piper".to_string(),
                "1".to_string(),
                voice,
                "1".to_string(),
                config.phoneme_type.clone(),
                "vits".to_string(),
            ],
        }
    }

    pub fn get(&self, key: MetadataKey) -> &str {
        &self.values[key as usize]
    }

    /// Entries in canonical key order
    pub fn iter(&self) -> impl Iterator<Item = (MetadataKey, &str)> {
        MetadataKey::ALL
            .into_iter()
            .zip(self.values.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_in_canonical_order() {
        let names: Vec<_> = MetadataKey::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            [
                "sample_rate",
                "n_speakers",
                "language",
                "comment",
                "has_espeak",
                "voice",
                "add_blank",
                "frontend",
                "model_type"
            ]
        );
        for (index, key) in MetadataKey::ALL.iter().enumerate() {
            assert_eq!(*key as usize, index);
        }
    }

    #[test]
    fn six_required_three_recommended() {
        let required = MetadataKey::ALL
            .iter()
            .filter(|k| k.severity() == Severity::Required)
            .count();
        assert_eq!(required, 6);
        assert_eq!(MetadataKey::AddBlank.severity(), Severity::Recommended);
        assert_eq!(MetadataKey::Voice.severity(), Severity::Required);
    }

    #[test]
    fn derive_from_empty_config() {
        let config = VoiceConfig::from_value(&json!({}));
        let derived = DerivedMetadata::derive(Path::new("modelfile.onnx"), &config);

        assert_eq!(derived.get(MetadataKey::SampleRate), "22050");
        assert_eq!(derived.get(MetadataKey::NSpeakers), "1");
        assert_eq!(derived.get(MetadataKey::Language), "English");
        assert_eq!(derived.get(MetadataKey::Comment), "piper");
        assert_eq!(derived.get(MetadataKey::HasEspeak), "1");
        assert_eq!(derived.get(MetadataKey::Voice), "en");
        assert_eq!(derived.get(MetadataKey::AddBlank), "1");
        assert_eq!(derived.get(MetadataKey::Frontend), "espeak");
        assert_eq!(derived.get(MetadataKey::ModelType), "vits");
    }

    #[test]
    fn derive_from_piper_config() {
        let config = VoiceConfig::from_value(&json!({
            "audio": { "sample_rate": 16000 },
            "num_speakers": 2,
            "language": { "code": "en_GB" },
            "phoneme_type": "pinyin"
        }));
        let derived = DerivedMetadata::derive(Path::new("voices/en_GB-vctk-medium.onnx"), &config);

        let entries: Vec<_> = derived.iter().map(|(k, v)| (k.as_str(), v)).collect();
        assert_eq!(
            entries,
            [
                ("sample_rate", "16000"),
                ("n_speakers", "2"),
                ("language", "English"),
                ("comment", "piper"),
                ("has_espeak", "1"),
                ("voice", "en-gb"),
                ("add_blank", "1"),
                ("frontend", "pinyin"),
                ("model_type", "vits"),
            ]
        );
    }
}
