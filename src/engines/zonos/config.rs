use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::model::ZonosError;

pub const DEFAULT_SAMPLING_RATE: u32 = 44_100;
pub const DEFAULT_SPEAKER_SAMPLING_RATE: u32 = 16_000;

#[derive(Debug, Deserialize)]
struct RawConfig {
    symbols: HashMap<String, i64>,
    languages: Vec<String>,
    sampling_rate: Option<u32>,
    speaker_sampling_rate: Option<u32>,
}

/// Contents of an exported model's `config.json`.
#[derive(Debug, Clone)]
pub struct ZonosConfig {
    /// IPA symbol to token id.
    pub symbols: HashMap<char, i64>,
    /// Supported language codes; a language's id is its index.
    pub languages: Vec<String>,
    /// Output rate of the autoencoder.
    pub sampling_rate: u32,
    /// Rate the speaker encoder expects its input at.
    pub speaker_sampling_rate: u32,
}

impl ZonosConfig {
    pub fn load(path: &Path) -> Result<Self, ZonosError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ZonosError> {
        let raw: RawConfig = serde_json::from_str(json)
            .map_err(|e| ZonosError::Config(format!("Failed to parse JSON: {e}")))?;

        let mut symbols = HashMap::with_capacity(raw.symbols.len());
        for (k, id) in raw.symbols {
            let mut chars = k.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => {
                    return Err(ZonosError::Config(format!(
                        "Symbol keys must be single characters, got {k:?}"
                    )))
                }
            };
            symbols.insert(ch, id);
        }

        if raw.languages.is_empty() {
            return Err(ZonosError::Config("'languages' must not be empty".to_string()));
        }

        Ok(Self {
            symbols,
            languages: raw.languages,
            sampling_rate: raw.sampling_rate.unwrap_or(DEFAULT_SAMPLING_RATE),
            speaker_sampling_rate: raw
                .speaker_sampling_rate
                .unwrap_or(DEFAULT_SPEAKER_SAMPLING_RATE),
        })
    }

    /// Language id for a language tag, matched case-insensitively.
    pub fn language_id(&self, language: &str) -> Result<i64, ZonosError> {
        self.languages
            .iter()
            .position(|l| l.eq_ignore_ascii_case(language))
            .map(|i| i as i64)
            .ok_or_else(|| ZonosError::UnsupportedLanguage(language.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "symbols": { " ": 0, "h": 1, "ə": 2, ".": 3 },
        "languages": ["de", "en-gb", "en-us"],
        "sampling_rate": 44100
    }"#;

    #[test]
    fn parses_symbols_and_defaults_speaker_rate() {
        let config = ZonosConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.symbols.get(&'ə'), Some(&2));
        assert_eq!(config.sampling_rate, 44_100);
        assert_eq!(config.speaker_sampling_rate, DEFAULT_SPEAKER_SAMPLING_RATE);
    }

    #[test]
    fn language_id_is_list_position() {
        let config = ZonosConfig::from_json(CONFIG).unwrap();
        assert_eq!(config.language_id("en-us").unwrap(), 2);
        assert_eq!(config.language_id("EN-GB").unwrap(), 1);
        assert!(matches!(
            config.language_id("xx"),
            Err(ZonosError::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn rejects_multi_char_symbols() {
        let err = ZonosConfig::from_json(r#"{ "symbols": { "ab": 1 }, "languages": ["en-us"] }"#)
            .unwrap_err();
        assert!(matches!(err, ZonosError::Config(_)));
    }
}
