use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use super::persistence::{KeyValueStore, StoreError};

/// A value mirrored to one key of a [`KeyValueStore`].
///
/// Read once when loaded, written through on every `set`. The in-memory value
/// only changes after the store accepted the write.
#[derive(Clone, Debug)]
pub struct PersistedField<T> {
    key: &'static str,
    value: T,
}

impl<T> PersistedField<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Loads `key` from `store`, falling back to `default` when the key is
    /// missing or holds something that no longer decodes as `T`.
    pub fn load<S>(store: &S, key: &'static str, default: impl FnOnce() -> T) -> Result<Self, StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let value = match store.get(key)? {
            Some(raw) => match serde_json::from_value(raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!(key, %err, "stored value is unreadable, using default");
                    default()
                }
            },
            None => default(),
        };
        Ok(Self { key, value })
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set<S>(&mut self, store: &mut S, value: T) -> Result<(), StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        store.set(self.key, serde_json::to_value(&value)?)?;
        self.value = value;
        Ok(())
    }

    /// Derives the next value from the current one and stores it.
    pub fn update<S>(&mut self, store: &mut S, f: impl FnOnce(&T) -> T) -> Result<(), StoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let next = f(&self.value);
        self.set(store, next)
    }
}
