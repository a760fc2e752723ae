use std::sync::Arc;

use popdict_config::{AutoRead, DisplaySettings};
use popdict_types::{Region, WordEntry};

use crate::gateway::PlaybackSurface;

/// Forwards audio URLs to the playback surface and runs the autoplay policy
pub struct AudioDispatcher {
    playback: Arc<dyn PlaybackSurface>,
    fired: bool,
}

impl AudioDispatcher {
    pub fn new(playback: Arc<dyn PlaybackSurface>) -> Self {
        Self {
            playback,
            fired: false,
        }
    }

    pub fn play(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        tracing::debug!("Playing {url}");
        self.playback.play(url);
    }

    /// Allow autoplay again, called on every new activation
    pub fn rearm(&mut self) {
        self.fired = false;
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Play the pronunciation `autoRead` asks for, once per activation.
    ///
    /// The single shot is spent even when nothing plays (no settings yet,
    /// `autoRead` off, missing audio); later settings changes never trigger it.
    pub fn autoplay(
        &mut self,
        entry: &WordEntry,
        settings: Option<&DisplaySettings>,
    ) -> Option<String> {
        if self.fired {
            return None;
        }
        self.fired = true;

        let region = match settings?.auto_read {
            AutoRead::Off => return None,
            AutoRead::Uk => Region::Uk,
            AutoRead::Us => Region::Us,
        };

        let url = entry.pronunciations.get(region)?.first_url()?.to_string();
        tracing::info!("Autoplay {} pronunciation", region.label());
        self.play(&url);
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use popdict_types::{Pronunciation, Pronunciations};

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl PlaybackSurface for Recorder {
        fn play(&self, url: &str) {
            self.0.lock().unwrap().push(url.to_string());
        }
    }

    fn entry() -> WordEntry {
        WordEntry {
            pronunciations: Pronunciations {
                uk: Some(Pronunciation {
                    ipa: "a".into(),
                    urls: vec!["u1".into()],
                }),
                us: Some(Pronunciation {
                    ipa: "a".into(),
                    urls: vec![],
                }),
            },
            ..WordEntry::default()
        }
    }

    fn settings(auto_read: AutoRead) -> DisplaySettings {
        DisplaySettings {
            auto_read,
            ..DisplaySettings::default()
        }
    }

    #[test]
    fn plays_matching_region_once() {
        let recorder = Arc::new(Recorder::default());
        let mut audio = AudioDispatcher::new(recorder.clone());

        assert_eq!(
            audio.autoplay(&entry(), Some(&settings(AutoRead::Uk))),
            Some("u1".into())
        );
        assert_eq!(audio.autoplay(&entry(), Some(&settings(AutoRead::Uk))), None);
        assert_eq!(*recorder.0.lock().unwrap(), vec!["u1".to_string()]);

        audio.rearm();
        audio.autoplay(&entry(), Some(&settings(AutoRead::Uk)));
        assert_eq!(recorder.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn empty_url_list_plays_nothing() {
        let recorder = Arc::new(Recorder::default());
        let mut audio = AudioDispatcher::new(recorder.clone());

        assert_eq!(audio.autoplay(&entry(), Some(&settings(AutoRead::Us))), None);
        assert!(audio.has_fired());
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn off_or_absent_settings_play_nothing() {
        let recorder = Arc::new(Recorder::default());
        let mut audio = AudioDispatcher::new(recorder.clone());

        assert_eq!(audio.autoplay(&entry(), None), None);
        audio.rearm();
        assert_eq!(audio.autoplay(&entry(), Some(&settings(AutoRead::Off))), None);
        assert!(recorder.0.lock().unwrap().is_empty());
    }
}
