//! Piper voice configuration (`<voice>.onnx.json`)
//!
//! Only a handful of fields matter for metadata derivation. The file is read
//! as an untyped JSON tree and resolved once into [`VoiceConfig`]; missing or
//! oddly-shaped fields fall back to the documented defaults instead of failing.

use std::path::Path;

use serde_json::Value;

use crate::error::{ConfigError, IoErrorExt, Result};

/// Sample rate assumed when `audio.sample_rate` is absent
pub const DEFAULT_SAMPLE_RATE: &str = "22050";

/// Speaker count assumed when `num_speakers` is absent
pub const DEFAULT_NUM_SPEAKERS: &str = "1";

/// Phonemizer assumed when `phoneme_type` is absent
pub const DEFAULT_PHONEME_TYPE: &str = "espeak";

/// Resolved voice configuration
///
/// Numeric fields are kept as their JSON rendering because they only ever
/// end up as metadata strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceConfig {
    pub sample_rate: String,
    pub num_speakers: String,
    pub language_code: Option<String>,
    pub phoneme_type: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE.to_string(),
            num_speakers: DEFAULT_NUM_SPEAKERS.to_string(),
            language_code: None,
            phoneme_type: DEFAULT_PHONEME_TYPE.to_string(),
        }
    }
}

impl VoiceConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path, ConfigError::read)?;

        let value: Value =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if !value.is_object() {
            return Err(ConfigError::NotAnObject {
                path: path.to_path_buf(),
            }
            .into());
        }

        let config = Self::from_value(&value);
        tracing::debug!(path = %path.display(), ?config, "Loaded voice configuration");
        Ok(config)
    }

    /// Resolve the fields we care about from an already-parsed JSON tree
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();

        let sample_rate = value
            .get("audio")
            .and_then(|audio| audio.get("sample_rate"))
            .and_then(scalar_to_string)
            .unwrap_or(defaults.sample_rate);

        let num_speakers = value
            .get("num_speakers")
            .and_then(scalar_to_string)
            .unwrap_or(defaults.num_speakers);

        // `language` may be a bare string in hand-written configs; only the
        // object form carries a code.
        let language_code = value
            .get("language")
            .filter(|language| language.is_object())
            .and_then(|language| language.get("code"))
            .and_then(Value::as_str)
            .filter(|code| !code.is_empty())
            .map(str::to_string);

        let phoneme_type = value
            .get("phoneme_type")
            .and_then(scalar_to_string)
            .unwrap_or(defaults.phoneme_type);

        Self {
            sample_rate,
            num_speakers,
            language_code,
            phoneme_type,
        }
    }
}

/// Render a JSON scalar the way it should appear in model metadata
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
