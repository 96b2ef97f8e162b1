use hashbrown::HashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend failed: {0}")]
    Backend(String),
    #[error("Storage is full, could not write {key}")]
    QuotaExceeded { key: String },
    #[error("Could not encode or decode the value stored under {key}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed store the engine persists best times and history into.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Values that live under one fixed key.
pub trait StorageKey {
    const KEY: &'static str;
}

pub fn load_json<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.set(key, raw)
}

/// Fixed-key counterpart of [`load_json`] and [`save_json`].
pub trait LocalOrDefault: StorageKey + Serialize + DeserializeOwned + Default {
    fn load_or_default(store: &impl KeyValueStore) -> Self {
        match load_json(store, Self::KEY) {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                log::warn!("Ignoring stored {}: {}", Self::KEY, err);
                Self::default()
            }
        }
    }

    fn save(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        save_json(store, Self::KEY, self)
    }
}

impl<T: StorageKey + Serialize + DeserializeOwned + Default> LocalOrDefault for T {}

/// In-memory store, optionally refusing writes to emulate a full browser storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    reject_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_writes() -> Self {
        Self {
            entries: HashMap::new(),
            reject_writes: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Counter(u32);

    impl StorageKey for Counter {
        const KEY: &'static str = "counter";
    }

    #[test]
    fn json_values_survive_the_store() {
        let mut store = MemoryStore::new();
        Counter(3).save(&mut store).unwrap();

        assert_eq!(store.get("counter").unwrap().as_deref(), Some("3"));
        assert_eq!(Counter::load_or_default(&store), Counter(3));
    }

    #[test]
    fn corrupt_value_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set("counter", "{not json".to_string()).unwrap();

        assert!(matches!(
            load_json::<Counter>(&store, "counter"),
            Err(StoreError::Serialization { .. })
        ));
        assert_eq!(Counter::load_or_default(&store), Counter(0));
    }

    #[test]
    fn rejecting_store_reports_quota() {
        let mut store = MemoryStore::rejecting_writes();

        assert!(matches!(
            Counter(1).save(&mut store),
            Err(StoreError::QuotaExceeded { .. })
        ));
        assert!(store.is_empty());
    }
}
