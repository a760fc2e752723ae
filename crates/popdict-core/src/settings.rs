use popdict_config::DisplaySettings;

use crate::error::SettingsError;

pub type SettingsCallback = Box<dyn Fn(Option<DisplaySettings>) + Send + Sync>;

/// Key-value store owning the user's settings
#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// One-shot read. `Ok(None)` when nothing is stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<DisplaySettings>, SettingsError>;

    /// Call `on_change` with every new value stored under `key` until the
    /// returned [`Subscription`] is dropped.
    fn subscribe(&self, key: &str, on_change: SettingsCallback) -> Subscription;
}

/// Live registration with a settings store, released on drop
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

/// Holds the latest settings snapshot for one popover.
///
/// Absent until the first read or push arrives.
#[derive(Default)]
pub struct SettingsReader {
    current: Option<DisplaySettings>,
    pushed: bool,
    subscription: Option<Subscription>,
}

impl SettingsReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, subscription: Subscription) {
        self.subscription = Some(subscription);
    }

    pub fn current(&self) -> Option<&DisplaySettings> {
        self.current.as_ref()
    }

    /// Apply the mount-time read. Returns whether the snapshot changed.
    pub fn on_loaded(&mut self, result: Result<Option<DisplaySettings>, SettingsError>) -> bool {
        if self.pushed {
            // a live update already superseded this read
            tracing::debug!("Ignoring settings read resolved after a live update");
            return false;
        }

        match result {
            Ok(value) => self.replace(value),
            Err(e) => {
                tracing::warn!("Settings read failed, continuing without settings: {e}");
                false
            }
        }
    }

    /// Apply a pushed change. Returns whether the snapshot changed.
    pub fn on_changed(&mut self, value: Option<DisplaySettings>) -> bool {
        self.pushed = true;
        self.replace(value)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Drop the store subscription
    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            tracing::debug!("Settings subscription released");
        }
    }

    fn replace(&mut self, value: Option<DisplaySettings>) -> bool {
        if self.current == value {
            return false;
        }
        self.current = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use popdict_config::AutoRead;

    use super::*;

    fn with_auto_read(auto_read: AutoRead) -> DisplaySettings {
        DisplaySettings {
            auto_read,
            ..DisplaySettings::default()
        }
    }

    #[test]
    fn late_read_does_not_override_push() {
        let mut reader = SettingsReader::new();

        assert!(reader.on_changed(Some(with_auto_read(AutoRead::Us))));
        assert!(!reader.on_loaded(Ok(Some(with_auto_read(AutoRead::Uk)))));
        assert_eq!(reader.current().map(|s| s.auto_read), Some(AutoRead::Us));
    }

    #[test]
    fn failed_read_leaves_settings_absent() {
        let mut reader = SettingsReader::new();
        assert!(!reader.on_loaded(Err(SettingsError::Unavailable("gone".into()))));
        assert!(reader.current().is_none());
    }

    #[test]
    fn release_runs_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let mut reader = SettingsReader::new();

        let counter = released.clone();
        reader.attach(Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(reader.is_subscribed());

        reader.release();
        reader.release();
        drop(reader);

        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_reader_releases_subscription() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let mut reader = SettingsReader::new();
            let counter = released.clone();
            reader.attach(Subscription::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
