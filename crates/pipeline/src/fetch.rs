//! Fetch boundary for geometry and attribute data.
//!
//! Transport is a black box behind `DataFetcher`: implementations return
//! parsed payloads or a `FetchError`. No retry policy lives here; a failure
//! is terminal for that one request.

use std::future::Future;
use std::pin::Pin;

use geodata::geojson::FeatureCollection;
use geodata::records::{AmbientRecord, Assignment};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug)]
pub struct FetchError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Trait for data providers.
///
/// Implementations must be `Send + Sync` for use across async tasks, and
/// must not borrow `name` beyond building the request. Methods return boxed
/// futures for dyn-compatibility.
pub trait DataFetcher: Send + Sync {
    /// Fetch one named geometry collection.
    fn fetch_geometry(&self, name: &str) -> BoxFuture<'_, Result<FeatureCollection, FetchError>>;

    /// Fetch the full ambient attribute set.
    fn fetch_ambients(&self) -> BoxFuture<'_, Result<Vec<AmbientRecord>, FetchError>>;

    /// Fetch the course assignment collection.
    fn fetch_assignments(&self) -> BoxFuture<'_, Result<Vec<Assignment>, FetchError>>;
}
