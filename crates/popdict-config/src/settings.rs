use serde::{Deserialize, Serialize};

/// Storage key the extension keeps its settings under
pub const SETTINGS_KEY: &str = "local:__shanbayExtensionSettings";

/// Which pronunciation plays as soon as an entry loads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum AutoRead {
    #[default]
    Off,
    Uk,
    Us,
}

impl From<Option<String>> for AutoRead {
    fn from(value: Option<String>) -> Self {
        // "en" is what the settings page writes for the British voice
        match value.as_deref() {
            Some("en" | "uk") => AutoRead::Uk,
            Some("us") => AutoRead::Us,
            _ => AutoRead::Off,
        }
    }
}

impl From<AutoRead> for String {
    fn from(value: AutoRead) -> Self {
        match value {
            AutoRead::Off => "none",
            AutoRead::Uk => "en",
            AutoRead::Us => "us",
        }
        .to_string()
    }
}

/// Which definition blocks are shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ParaphraseLanguage {
    #[default]
    All,
    EnglishOnly,
    ChineseOnly,
}

impl ParaphraseLanguage {
    pub fn shows_chinese(self) -> bool {
        self != ParaphraseLanguage::EnglishOnly
    }

    pub fn shows_english(self) -> bool {
        self != ParaphraseLanguage::ChineseOnly
    }
}

impl From<Option<String>> for ParaphraseLanguage {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("English" | "english") => ParaphraseLanguage::EnglishOnly,
            Some("Chinese" | "chinese") => ParaphraseLanguage::ChineseOnly,
            _ => ParaphraseLanguage::All,
        }
    }
}

impl From<ParaphraseLanguage> for String {
    fn from(value: ParaphraseLanguage) -> Self {
        match value {
            ParaphraseLanguage::All => "bilingual",
            ParaphraseLanguage::EnglishOnly => "English",
            ParaphraseLanguage::ChineseOnly => "Chinese",
        }
        .to_string()
    }
}

/// User preferences owned by the settings store.
///
/// The popover only ever reads these; a missing snapshot is not the same
/// as `DisplaySettings::default()` and callers must treat it as "do nothing".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    #[serde(rename = "autoRead")]
    pub auto_read: AutoRead,
    #[serde(rename = "paraphrase")]
    pub paraphrase_language: ParaphraseLanguage,
    /// Offer a "show examples" button instead of fetching examples right away
    #[serde(rename = "exampleSentence")]
    pub show_example_affordance: bool,
}
