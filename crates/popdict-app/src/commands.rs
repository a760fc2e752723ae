use popdict_core::view::{EntryView, View};
use popdict_types::Region;

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Word(String),
    Favorite,
    Examples,
    Play(AudioTarget),
    Help,
    Quit,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioTarget {
    Pronunciation(Region),
    /// 1-based, as printed
    Example(usize),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown command `{0}`, try :help")]
    Unknown(String),
    #[error("Usage: :play uk|us|<example number>")]
    BadAudioTarget,
}

pub const HELP: &str = "\
<word>            look up a word
:fav              add to / remove from the word book
:ex               load example sentences
:play uk|us|<n>   play a pronunciation or example n
:q                quit";

pub fn parse(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Blank);
    }

    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Word(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    match parts.next().unwrap_or_default() {
        "fav" | "f" => Ok(Input::Favorite),
        "ex" | "e" => Ok(Input::Examples),
        "play" | "p" => parse_audio_target(parts.next()).map(Input::Play),
        "help" | "h" | "?" => Ok(Input::Help),
        "q" | "quit" => Ok(Input::Quit),
        other => Err(InputError::Unknown(other.to_string())),
    }
}

fn parse_audio_target(arg: Option<&str>) -> Result<AudioTarget, InputError> {
    match arg {
        Some("uk") => Ok(AudioTarget::Pronunciation(Region::Uk)),
        Some("us") => Ok(AudioTarget::Pronunciation(Region::Us)),
        Some(n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Ok(AudioTarget::Example(n)),
            _ => Err(InputError::BadAudioTarget),
        },
        None => Err(InputError::BadAudioTarget),
    }
}

/// URL behind an audio control of the rendered view, if that control exists
pub fn audio_url(view: &View, target: AudioTarget) -> Option<String> {
    let View::Entry(entry) = view else {
        return None;
    };

    match target {
        AudioTarget::Pronunciation(region) => pronunciation_url(entry, region),
        AudioTarget::Example(number) => entry
            .examples
            .as_ref()?
            .iter()
            .find(|line| line.number == number)?
            .audio_url
            .clone(),
    }
}

fn pronunciation_url(entry: &EntryView, region: Region) -> Option<String> {
    entry
        .pronunciations
        .iter()
        .find(|row| row.region == region)
        .map(|row| row.audio_url.clone())
}

#[cfg(test)]
mod tests {
    use popdict_core::view::{ExampleLine, Header, PronunciationRow};

    use super::*;

    #[test]
    fn plain_lines_are_words() {
        assert_eq!(parse("  apple \n"), Ok(Input::Word("apple".into())));
        assert_eq!(parse("ice cream"), Ok(Input::Word("ice cream".into())));
        assert_eq!(parse("   "), Ok(Input::Blank));
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse(":fav"), Ok(Input::Favorite));
        assert_eq!(parse(":ex"), Ok(Input::Examples));
        assert_eq!(parse(":q"), Ok(Input::Quit));
        assert_eq!(
            parse(":play us"),
            Ok(Input::Play(AudioTarget::Pronunciation(Region::Us)))
        );
        assert_eq!(parse(":p 2"), Ok(Input::Play(AudioTarget::Example(2))));
    }

    #[test]
    fn rejects_bad_commands() {
        assert_eq!(parse(":nope"), Err(InputError::Unknown("nope".into())));
        assert_eq!(parse(":"), Err(InputError::Unknown(String::new())));
        assert_eq!(parse(":play"), Err(InputError::BadAudioTarget));
        assert_eq!(parse(":play 0"), Err(InputError::BadAudioTarget));
        assert_eq!(parse(":play fr"), Err(InputError::BadAudioTarget));
    }

    fn entry() -> View {
        View::Entry(EntryView {
            header: Header {
                word: "apple".into(),
                detail_url: None,
                favorite: None,
            },
            pronunciations: vec![PronunciationRow {
                region: Region::Us,
                ipa: "ˈæpl".into(),
                audio_url: "u2".into(),
            }],
            definitions: Vec::new(),
            examples: Some(vec![
                ExampleLine {
                    number: 1,
                    text_en: "An <b>apple</b>.".into(),
                    text_cn: "一个苹果。".into(),
                    audio_url: Some("e1".into()),
                },
                ExampleLine {
                    number: 2,
                    text_en: "Two.".into(),
                    text_cn: "两个。".into(),
                    audio_url: None,
                },
            ]),
            example_trigger: false,
        })
    }

    #[test]
    fn resolves_audio_from_view() {
        let view = entry();

        let us = AudioTarget::Pronunciation(Region::Us);
        let uk = AudioTarget::Pronunciation(Region::Uk);
        assert_eq!(audio_url(&view, us), Some("u2".into()));
        assert_eq!(audio_url(&view, uk), None);
        assert_eq!(audio_url(&view, AudioTarget::Example(1)), Some("e1".into()));
        assert_eq!(audio_url(&view, AudioTarget::Example(2)), None);
        assert_eq!(audio_url(&view, AudioTarget::Example(3)), None);
        assert_eq!(audio_url(&View::Loading, us), None);
    }
}
