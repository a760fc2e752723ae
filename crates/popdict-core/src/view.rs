//! Pure projection of popover state into a render tree.
//!
//! Nothing here performs I/O or mutates state. Hosts turn the [`View`] into
//! whatever markup they render.

use popdict_config::DisplaySettings;
use popdict_config::links::Links;
use popdict_types::{Definition, ExampleSentence, Region, SavedState, WordEntry};

use crate::lookup::LookupState;

/// Everything the projector looks at
pub struct ViewInput<'a> {
    pub lookup: &'a LookupState,
    pub examples: Option<&'a [ExampleSentence]>,
    pub settings: Option<&'a DisplaySettings>,
    /// Offer the manual "show examples" action
    pub example_trigger: bool,
    pub links: &'a Links,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading,
    AuthError { login_url: String },
    NotFound,
    GenericError,
    Entry(EntryView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub header: Header,
    pub pronunciations: Vec<PronunciationRow>,
    pub definitions: Vec<DefinitionBlock>,
    pub examples: Option<Vec<ExampleLine>>,
    pub example_trigger: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub word: String,
    pub detail_url: Option<String>,
    /// None when the saved state is unknown
    pub favorite: Option<FavoriteControl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteControl {
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PronunciationRow {
    pub region: Region,
    pub ipa: String,
    pub audio_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionLanguage {
    Chinese,
    English,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionBlock {
    pub language: DefinitionLanguage,
    pub items: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleLine {
    /// 1-based position in the list
    pub number: usize,
    pub text_en: String,
    pub text_cn: String,
    pub audio_url: Option<String>,
}

pub fn project(input: &ViewInput<'_>) -> View {
    match input.lookup {
        LookupState::Loading => View::Loading,
        LookupState::AuthError => View::AuthError {
            login_url: input.links.login_url.clone(),
        },
        LookupState::NotFound => View::NotFound,
        LookupState::GenericError => View::GenericError,
        LookupState::Ready(entry) => View::Entry(project_entry(entry, input)),
    }
}

fn project_entry(entry: &WordEntry, input: &ViewInput<'_>) -> EntryView {
    let favorite = match entry.saved_state {
        SavedState::Saved => Some(FavoriteControl { active: true }),
        SavedState::NotSaved => Some(FavoriteControl { active: false }),
        SavedState::UnknownError => None,
    };

    let header = Header {
        word: entry.content.clone().unwrap_or_default(),
        detail_url: entry.id.as_ref().map(|id| input.links.detail_url(id)),
        favorite,
    };

    let pronunciations = [Region::Uk, Region::Us]
        .into_iter()
        .filter_map(|region| {
            let pronunciation = entry.pronunciations.get(region)?;
            Some(PronunciationRow {
                region,
                ipa: pronunciation.ipa.clone(),
                audio_url: pronunciation.first_url()?.to_string(),
            })
        })
        .collect();

    let paraphrase = input
        .settings
        .map(|s| s.paraphrase_language)
        .unwrap_or_default();

    let mut definitions = Vec::new();
    if paraphrase.shows_chinese() && !entry.definitions.cn.is_empty() {
        definitions.push(DefinitionBlock {
            language: DefinitionLanguage::Chinese,
            items: entry.definitions.cn.clone(),
        });
    }
    if paraphrase.shows_english() && !entry.definitions.en.is_empty() {
        definitions.push(DefinitionBlock {
            language: DefinitionLanguage::English,
            items: entry.definitions.en.clone(),
        });
    }

    let examples: Option<Vec<ExampleLine>> = input
        .examples
        .filter(|examples| !examples.is_empty())
        .map(|examples| {
            examples
                .iter()
                .enumerate()
                .map(|(idx, example)| ExampleLine {
                    number: idx + 1,
                    text_en: example.text_en.clone(),
                    text_cn: example.text_cn.clone(),
                    audio_url: example.audio_url().map(str::to_string),
                })
                .collect()
        });

    EntryView {
        header,
        pronunciations,
        definitions,
        example_trigger: examples.is_none() && input.example_trigger,
        examples,
    }
}

#[cfg(test)]
mod tests {
    use popdict_config::ParaphraseLanguage;
    use popdict_types::{Definitions, EntryId, Pronunciation, Pronunciations};

    use super::*;

    fn definition(text: &str) -> Definition {
        Definition {
            source_id: "d".into(),
            part_of_speech: "n.".into(),
            text: text.into(),
        }
    }

    fn entry() -> WordEntry {
        WordEntry {
            id: Some(EntryId::from(42u64)),
            content: Some("apple".into()),
            pronunciations: Pronunciations {
                uk: Some(Pronunciation {
                    ipa: "ˈæp.əl".into(),
                    urls: vec!["u1".into()],
                }),
                us: Some(Pronunciation {
                    ipa: "ˈæp.əl".into(),
                    urls: vec![],
                }),
            },
            definitions: Definitions {
                cn: vec![definition("苹果")],
                en: vec![definition("a round fruit")],
            },
            saved_state: SavedState::Saved,
        }
    }

    fn render(
        lookup: &LookupState,
        settings: Option<&DisplaySettings>,
        examples: Option<&[ExampleSentence]>,
    ) -> View {
        let links = Links::default();
        project(&ViewInput {
            lookup,
            examples,
            settings,
            example_trigger: false,
            links: &links,
        })
    }

    fn entry_view(view: View) -> EntryView {
        match view {
            View::Entry(entry) => entry,
            other => panic!("expected entry view, got {other:?}"),
        }
    }

    fn languages(view: &EntryView) -> Vec<DefinitionLanguage> {
        view.definitions.iter().map(|b| b.language).collect()
    }

    #[test]
    fn terminal_states_pick_one_block() {
        assert_eq!(render(&LookupState::Loading, None, None), View::Loading);
        assert_eq!(render(&LookupState::NotFound, None, None), View::NotFound);
        assert_eq!(render(&LookupState::GenericError, None, None), View::GenericError);
        assert_eq!(
            render(&LookupState::AuthError, None, None),
            View::AuthError {
                login_url: Links::default().login_url
            }
        );
    }

    #[test]
    fn header_links_and_favorite() {
        let view = entry_view(render(&LookupState::Ready(entry()), None, None));

        assert_eq!(view.header.word, "apple");
        assert_eq!(
            view.header.detail_url.as_deref(),
            Some("https://web.shanbay.com/wordsweb/#/detail/42")
        );
        assert_eq!(view.header.favorite, Some(FavoriteControl { active: true }));
    }

    #[test]
    fn unknown_saved_state_hides_favorite() {
        let mut e = entry();
        e.saved_state = SavedState::UnknownError;
        let view = entry_view(render(&LookupState::Ready(e), None, None));
        assert_eq!(view.header.favorite, None);
    }

    #[test]
    fn pronunciation_rows_need_audio() {
        let view = entry_view(render(&LookupState::Ready(entry()), None, None));
        assert_eq!(
            view.pronunciations,
            vec![PronunciationRow {
                region: Region::Uk,
                ipa: "ˈæp.əl".into(),
                audio_url: "u1".into(),
            }]
        );
    }

    #[test]
    fn paraphrase_language_gates_blocks() {
        let lookup = LookupState::Ready(entry());
        let with = |paraphrase_language| DisplaySettings {
            paraphrase_language,
            ..DisplaySettings::default()
        };

        let all = entry_view(render(&lookup, None, None));
        assert_eq!(
            languages(&all),
            [DefinitionLanguage::Chinese, DefinitionLanguage::English]
        );

        let english = entry_view(render(&lookup, Some(&with(ParaphraseLanguage::EnglishOnly)), None));
        assert_eq!(languages(&english), [DefinitionLanguage::English]);

        let chinese = entry_view(render(&lookup, Some(&with(ParaphraseLanguage::ChineseOnly)), None));
        assert_eq!(languages(&chinese), [DefinitionLanguage::Chinese]);
    }

    #[test]
    fn empty_definitions_are_suppressed() {
        let mut e = entry();
        e.definitions.en.clear();
        let view = entry_view(render(&LookupState::Ready(e), None, None));
        assert_eq!(languages(&view), [DefinitionLanguage::Chinese]);
    }

    #[test]
    fn examples_are_numbered_in_order() {
        let examples = vec![
            ExampleSentence {
                text_en: "first".into(),
                text_cn: "一".into(),
                audio: Pronunciation {
                    ipa: String::new(),
                    urls: vec!["e1".into()],
                },
            },
            ExampleSentence {
                text_en: "second".into(),
                text_cn: "二".into(),
                audio: Pronunciation::default(),
            },
        ];

        let view = entry_view(render(&LookupState::Ready(entry()), None, Some(examples.as_slice())));
        let lines = view.examples.unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].number, lines[0].text_en.as_str()), (1, "first"));
        assert_eq!(lines[0].audio_url.as_deref(), Some("e1"));
        assert_eq!((lines[1].number, lines[1].text_en.as_str()), (2, "second"));
        assert_eq!(lines[1].audio_url, None);
    }

    #[test]
    fn empty_examples_render_no_block() {
        let view = entry_view(render(&LookupState::Ready(entry()), None, Some(&[][..])));
        assert!(view.examples.is_none());
    }
}
