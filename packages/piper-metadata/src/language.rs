//! Language name and espeak voice derivation
//!
//! sherpa-onnx configures espeak-ng from two metadata fields: `language`, the
//! full English language name, and `voice`, the lower-case espeak identifier.
//! Piper voices are named `{lang}_{REGION}-{speaker}-{quality}.onnx`, so the
//! file name is a usable fallback when the config has no language code.

use std::path::Path;

/// ISO 639-1 code to English language name, sorted by code
static LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("am", "Amharic"),
    ("ar", "Arabic"),
    ("bn", "Bengali"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("cy", "Welsh"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("gl", "Galician"),
    ("gu", "Gujarati"),
    ("ha", "Hausa"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("jv", "Javanese"),
    ("ka", "Georgian"),
    ("kk", "Kazakh"),
    ("km", "Khmer"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("lb", "Luxembourgish"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("ml", "Malayalam"),
    ("mn", "Mongolian"),
    ("mr", "Marathi"),
    ("ms", "Malay"),
    ("my", "Burmese"),
    ("ne", "Nepali"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pa", "Punjabi"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("so", "Somali"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("yo", "Yoruba"),
    ("zh", "Chinese"),
];

/// ISO code used when neither the config nor the file name provides one
pub const DEFAULT_ISO_CODE: &str = "en";

/// Look up the English name for an ISO code
pub fn language_name(iso_code: &str) -> Option<&'static str> {
    LANGUAGE_NAMES
        .binary_search_by_key(&iso_code, |&(code, _)| code)
        .ok()
        .map(|index| LANGUAGE_NAMES[index].1)
}

/// Language name and espeak voice for a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageVoice {
    pub language: String,
    pub voice: String,
}

/// Derive the language name and voice from the config code, falling back
/// to the model file name.
pub fn derive_language_and_voice(model_path: &Path, language_code: Option<&str>) -> LanguageVoice {
    let mut iso_code = String::new();
    let mut region = String::new();

    if let Some(code) = language_code.filter(|code| !code.is_empty()) {
        let mut parts = code.split('_');
        iso_code = parts.next().unwrap_or_default().to_lowercase();
        region = parts.next().map(str::to_lowercase).unwrap_or_default();
    }

    if iso_code.is_empty() {
        let stem = model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();

        if stem.contains('_') {
            let mut parts = stem.split('_');
            iso_code = parts.next().unwrap_or_default().to_lowercase();
            // en_US-amy-medium -> US
            if let Some(rest) = parts.next() {
                region = rest.split('-').next().unwrap_or_default().to_lowercase();
            }
        }
    }

    if iso_code.is_empty() {
        iso_code = DEFAULT_ISO_CODE.to_string();
    }

    let language = language_name(&iso_code)
        .map(str::to_string)
        .unwrap_or_else(|| title_case(&iso_code));

    let voice = if region.is_empty() {
        iso_code
    } else {
        format!("{iso_code}-{region}")
    };

    tracing::debug!(%language, %voice, "Derived language and voice");
    LanguageVoice { language, voice }
}

/// Upper-case the first letter of each whitespace-separated word
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}
