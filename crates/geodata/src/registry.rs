use std::collections::BTreeMap;

use crate::geojson::FeatureCollection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateKey(String),
    NotFound(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::DuplicateKey(key) => {
                write!(f, "geometry source {key:?} is already registered")
            }
            RegistryError::NotFound(key) => write!(f, "geometry source {key:?} is not registered"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Immutable, named geometry collections keyed by their logical source name.
///
/// Registration is load-once: a key can never be rebound, so a registered
/// collection is stable for the lifetime of the registry.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<String, FeatureCollection>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        key: impl Into<String>,
        collection: FeatureCollection,
    ) -> Result<(), RegistryError> {
        let key = key.into();
        if self.sources.contains_key(&key) {
            return Err(RegistryError::DuplicateKey(key));
        }
        self.sources.insert(key, collection);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FeatureCollection> {
        self.sources.get(key)
    }

    /// Programmer-facing lookup: a missing key is an error, not a silent miss.
    pub fn require(&self, key: &str) -> Result<&FeatureCollection, RegistryError> {
        self.sources
            .get(key)
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.sources.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }
}
