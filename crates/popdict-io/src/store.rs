use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use popdict_config::DisplaySettings;
use popdict_core::settings::{SettingsCallback, SettingsStore, Subscription};
use popdict_core::SettingsError;

type Listener = Arc<dyn Fn(Option<DisplaySettings>) + Send + Sync>;

#[derive(Default)]
struct Inner {
    values: HashMap<String, DisplaySettings>,
    listeners: Vec<(u64, String, Listener)>,
    next_id: u64,
}

/// In-process settings store. Clones share the same values and listeners.
#[derive(Clone, Default)]
pub struct MemorySettingsStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, key: &str) -> Option<DisplaySettings> {
        self.lock().values.get(key).cloned()
    }

    /// Store `value` under `key` and notify subscribers if it changed.
    /// `None` removes the key.
    pub fn set(&self, key: &str, value: Option<DisplaySettings>) {
        let notify: Vec<Listener> = {
            let mut inner = self.lock();
            let previous = match &value {
                Some(settings) => inner.values.insert(key.to_string(), settings.clone()),
                None => inner.values.remove(key),
            };
            if previous == value {
                return;
            }
            inner
                .listeners
                .iter()
                .filter(|(_, listening, _)| listening == key)
                .map(|(_, _, listener)| listener.clone())
                .collect()
        };

        // listeners run outside the lock so they may read the store
        for listener in notify {
            listener(value.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<DisplaySettings>, SettingsError> {
        Ok(self.value(key))
    }

    fn subscribe(&self, key: &str, on_change: SettingsCallback) -> Subscription {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner
                .listeners
                .push((id, key.to_string(), Arc::from(on_change)));
            id
        };

        let inner: Weak<Mutex<Inner>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .listeners
                    .retain(|(other, _, _)| *other != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use popdict_config::AutoRead;

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<Option<DisplaySettings>>>>, SettingsCallback) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, Box::new(move |value| sink.lock().unwrap().push(value)))
    }

    fn uk() -> DisplaySettings {
        DisplaySettings {
            auto_read: AutoRead::Uk,
            ..DisplaySettings::default()
        }
    }

    #[tokio::test]
    async fn get_reads_current_value() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", Some(uk()));
        assert_eq!(store.get("k").await.unwrap(), Some(uk()));
    }

    #[test]
    fn notifies_matching_key_on_change_only() {
        let store = MemorySettingsStore::new();
        let (seen, callback) = recorder();
        let _subscription = store.subscribe("k", callback);

        store.set("other", Some(uk()));
        store.set("k", Some(uk()));
        store.set("k", Some(uk()));
        store.set("k", None);

        assert_eq!(*seen.lock().unwrap(), vec![Some(uk()), None]);
    }

    #[test]
    fn dropping_subscription_stops_notifications() {
        let store = MemorySettingsStore::new();
        let (seen, callback) = recorder();
        let subscription = store.subscribe("k", callback);
        assert_eq!(store.listener_count(), 1);

        drop(subscription);
        assert_eq!(store.listener_count(), 0);

        store.set("k", Some(uk()));
        assert!(seen.lock().unwrap().is_empty());
    }
}
