use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier the provider assigns to a dictionary record.
///
/// The provider sends either a string or a number; both are kept verbatim
/// so the id goes back out exactly as it came in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{n}"),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for EntryId {
    fn from(value: u64) -> Self {
        EntryId::Number(value.into())
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        EntryId::Text(value.to_string())
    }
}

/// Accent of a pronunciation variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Uk,
    Us,
}

impl Region {
    pub fn label(self) -> &'static str {
        match self {
            Region::Uk => "uk",
            Region::Us => "us",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronunciation {
    #[serde(default)]
    pub ipa: String,
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Pronunciation {
    /// First audio URL, the canonical recording
    pub fn first_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str).filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pronunciations {
    #[serde(default)]
    pub uk: Option<Pronunciation>,
    #[serde(default)]
    pub us: Option<Pronunciation>,
}

impl Pronunciations {
    pub fn get(&self, region: Region) -> Option<&Pronunciation> {
        match region {
            Region::Uk => self.uk.as_ref(),
            Region::Us => self.us.as_ref(),
        }
    }
}

/// One sense of the word as given by a single dictionary source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    /// Source dictionary id, not unique across sources
    #[serde(rename = "dict_id", default)]
    pub source_id: String,
    #[serde(rename = "pos", default)]
    pub part_of_speech: String,
    #[serde(rename = "def", default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub cn: Vec<Definition>,
    #[serde(default)]
    pub en: Vec<Definition>,
}

/// Whether the word sits in the user's saved list.
///
/// `UnknownError` means the provider could not tell; no favorite control
/// may be offered for such an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SavedState {
    Saved,
    #[default]
    NotSaved,
    UnknownError,
}

impl SavedState {
    /// `Saved` and `NotSaved` swap; `UnknownError` stays put.
    pub fn flipped(&self) -> SavedState {
        match self {
            SavedState::Saved => SavedState::NotSaved,
            SavedState::NotSaved => SavedState::Saved,
            SavedState::UnknownError => SavedState::UnknownError,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SavedState::UnknownError)
    }
}

/// A single dictionary record as shown in the popover
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawEntry")]
pub struct WordEntry {
    pub id: Option<EntryId>,
    pub content: Option<String>,
    pub pronunciations: Pronunciations,
    pub definitions: Definitions,
    pub saved_state: SavedState,
}

impl WordEntry {
    /// Surface form, if the provider sent a non-empty one
    pub fn word(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

// Shape of the lookup payload on the wire
#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<EntryId>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    audios: Option<Vec<Pronunciations>>,
    #[serde(default)]
    definitions: Option<Definitions>,
    #[serde(default)]
    exists: Option<RawExists>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawExists {
    Flag(bool),
    Marker(String),
}

impl From<RawEntry> for WordEntry {
    fn from(raw: RawEntry) -> Self {
        // only the first audio set is ever shown
        let pronunciations = raw
            .audios
            .and_then(|audios| audios.into_iter().next())
            .unwrap_or_default();

        let saved_state = match raw.exists {
            Some(RawExists::Flag(true)) => SavedState::Saved,
            Some(RawExists::Flag(false)) | None => SavedState::NotSaved,
            Some(RawExists::Marker(_)) => SavedState::UnknownError,
        };

        WordEntry {
            id: raw.id,
            content: raw.content,
            pronunciations,
            definitions: raw.definitions.unwrap_or_default(),
            saved_state,
        }
    }
}
