use serde::Deserialize;

use crate::entry::Pronunciation;

/// Usage example attached to a [`WordEntry`](crate::WordEntry)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawExample")]
pub struct ExampleSentence {
    /// English sentence, target word wrapped in `<b>` after [`normalized`](Self::normalized)
    pub text_en: String,
    pub text_cn: String,
    pub audio: Pronunciation,
}

impl ExampleSentence {
    /// Rewrites the provider's `<vocab>` highlight into a plain `<b>` emphasis.
    pub fn normalized(mut self) -> Self {
        self.text_en = normalize_markup(&self.text_en);
        self
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.audio.first_url()
    }
}

pub fn normalize_markup(text: &str) -> String {
    text.replace("<vocab>", "<b>").replace("</vocab>", "</b>")
}

#[derive(Deserialize)]
struct RawExample {
    #[serde(default)]
    content_en: String,
    #[serde(default)]
    content_cn: String,
    #[serde(default)]
    audio: RawExampleAudio,
}

#[derive(Default, Deserialize)]
struct RawExampleAudio {
    #[serde(default)]
    us: Option<Pronunciation>,
}

impl From<RawExample> for ExampleSentence {
    fn from(raw: RawExample) -> Self {
        ExampleSentence {
            text_en: raw.content_en,
            text_cn: raw.content_cn,
            audio: raw.audio.us.unwrap_or_default(),
        }
    }
}
