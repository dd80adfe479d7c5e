use nh_core::{Category, Country, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{KeyValueStore, MemoryStore};

pub const ACTIVE_CATEGORY_KEY: &str = "activeCategory";
pub const CATEGORY_NAME_KEY: &str = "nameCategory";
pub const SELECTED_COUNTRY_KEY: &str = "selectedCountry";

/// Header selections that outlive a reload.
///
/// `activeCategory` and `nameCategory` are stored JSON-encoded, `selectedCountry`
/// as the raw code. Keys are written independently, so a reader may observe a
/// new category next to the previous name.
///
/// The first backend failure switches the session over to an in-memory map.
/// Every value read or written is mirrored there, and keys the map lacks are
/// still read from the backend, so degrading never loses a stored selection.
/// Nothing here ever returns an error to the caller.
#[derive(Debug)]
pub struct PersistentPreferences {
    backend: Arc<dyn KeyValueStore>,
    fallback: MemoryStore,
    degraded: AtomicBool,
}

impl PersistentPreferences {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            fallback: MemoryStore::new(),
            degraded: AtomicBool::new(false),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    pub fn active_category(&self) -> Option<Category> {
        let code: String = self.get_json(ACTIVE_CATEGORY_KEY)?;
        match code.parse() {
            Ok(category) => Some(category),
            Err(e) => {
                warn!("Ignoring persisted {}: {}", ACTIVE_CATEGORY_KEY, e);
                None
            }
        }
    }

    pub fn set_active_category(&self, category: Category) {
        self.set_json(ACTIVE_CATEGORY_KEY, &category.code());
    }

    pub fn category_name(&self) -> Option<String> {
        self.get_json(CATEGORY_NAME_KEY)
    }

    pub fn set_category_name(&self, name: &str) {
        self.set_json(CATEGORY_NAME_KEY, &name);
    }

    pub fn selected_country(&self) -> Option<Country> {
        let code = self.get(SELECTED_COUNTRY_KEY)?;
        match code.parse() {
            Ok(country) => Some(country),
            Err(e) => {
                warn!("Ignoring persisted {}: {}", SELECTED_COUNTRY_KEY, e);
                None
            }
        }
    }

    pub fn set_selected_country(&self, country: Country) {
        self.set(SELECTED_COUNTRY_KEY, country.code());
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Malformed value under {}: {}", key, e);
                None
            }
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, &raw),
            Err(e) => warn!("Failed to encode value for {}: {}", key, e),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        if self.is_degraded() {
            // Writes made since degrading shadow whatever the backend still holds
            return self
                .fallback
                .get(key)
                .ok()
                .flatten()
                .or_else(|| self.backend.get(key).ok().flatten());
        }
        match self.recover(self.backend.get(key)) {
            Some(value) => {
                if let Some(raw) = &value {
                    let _ = self.fallback.set(key, raw);
                }
                value
            }
            None => self.fallback.get(key).ok().flatten(),
        }
    }

    fn set(&self, key: &str, value: &str) {
        // In-memory writes cannot fail.
        let _ = self.fallback.set(key, value);
        if !self.is_degraded() && self.recover(self.backend.set(key, value)).is_some() {
            debug!("Persisted {}", key);
        }
    }

    fn recover<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                if !self.degraded.swap(true, Ordering::AcqRel) {
                    warn!("Preference storage unavailable, keeping selections in memory: {}", e);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nh_core::Error;

    #[derive(Debug)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::StorageUnavailable("quota exceeded".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::StorageUnavailable("quota exceeded".to_string()))
        }
    }

    /// Accepts reads, rejects every write.
    #[derive(Debug)]
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::StorageUnavailable("read-only".to_string()))
        }
    }

    fn read_only(entries: &[(&str, &str)]) -> Arc<ReadOnlyStore> {
        let inner = MemoryStore::new();
        for (key, value) in entries {
            inner.set(key, value).unwrap();
        }
        Arc::new(ReadOnlyStore(inner))
    }

    #[test]
    fn test_absent_keys_use_defaults() {
        let prefs = PersistentPreferences::in_memory();
        assert_eq!(prefs.active_category(), None);
        assert_eq!(prefs.category_name(), None);
        assert_eq!(prefs.selected_country(), None);
    }

    #[test]
    fn test_encoding_per_key() {
        let backend = Arc::new(MemoryStore::new());
        let prefs = PersistentPreferences::new(backend.clone());

        prefs.set_active_category(Category::Business);
        prefs.set_category_name("Kinh doanh");
        prefs.set_selected_country(Country::Jp);

        assert_eq!(backend.get(ACTIVE_CATEGORY_KEY).unwrap().as_deref(), Some("\"business\""));
        assert_eq!(backend.get(CATEGORY_NAME_KEY).unwrap().as_deref(), Some("\"Kinh doanh\""));
        assert_eq!(backend.get(SELECTED_COUNTRY_KEY).unwrap().as_deref(), Some("jp"));
    }

    #[test]
    fn test_unknown_codes_are_absent() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(ACTIVE_CATEGORY_KEY, "\"weather\"").unwrap();
        backend.set(SELECTED_COUNTRY_KEY, "zz").unwrap();
        backend.set(CATEGORY_NAME_KEY, "not json").unwrap();

        let prefs = PersistentPreferences::new(backend);
        assert_eq!(prefs.active_category(), None);
        assert_eq!(prefs.selected_country(), None);
        assert_eq!(prefs.category_name(), None);
    }

    #[test]
    fn test_degrades_to_memory() {
        let prefs = PersistentPreferences::new(Arc::new(BrokenStore));
        assert_eq!(prefs.active_category(), None);
        assert!(prefs.is_degraded());

        prefs.set_active_category(Category::Health);
        prefs.set_selected_country(Country::Fr);
        assert_eq!(prefs.active_category(), Some(Category::Health));
        assert_eq!(prefs.selected_country(), Some(Country::Fr));
    }

    #[test]
    fn test_failed_write_keeps_stored_values() {
        let backend = read_only(&[
            (ACTIVE_CATEGORY_KEY, "\"sports\""),
            (CATEGORY_NAME_KEY, "\"Thể thao\""),
        ]);
        let prefs = PersistentPreferences::new(backend);

        prefs.set_selected_country(Country::Jp);
        assert!(prefs.is_degraded());

        assert_eq!(prefs.active_category(), Some(Category::Sports));
        assert_eq!(prefs.category_name().as_deref(), Some("Thể thao"));
        assert_eq!(prefs.selected_country(), Some(Country::Jp));
    }

    #[test]
    fn test_values_read_before_degrading_are_kept() {
        let backend = read_only(&[(ACTIVE_CATEGORY_KEY, "\"science\"")]);
        let prefs = PersistentPreferences::new(backend);
        assert_eq!(prefs.active_category(), Some(Category::Science));

        prefs.set_category_name("Khoa học");
        assert!(prefs.is_degraded());
        assert_eq!(prefs.active_category(), Some(Category::Science));

        prefs.set_active_category(Category::Health);
        assert_eq!(prefs.active_category(), Some(Category::Health));
    }
}
