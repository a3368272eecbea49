//! HTTP-backed `DataFetcher`.
//!
//! Geometry comes from `<data base>/geojson/<name>`, attribute and
//! assignment records from the campus API. Failures carry their transport
//! error as a source; there are no retries.

use geodata::geojson::FeatureCollection;
use geodata::records::{AmbientRecord, Assignment};
use pipeline::fetch::{BoxFuture, DataFetcher, FetchError};
use serde_json::Value;

pub struct HttpFetcher {
    client: reqwest::Client,
    data_base: String,
    api_base: String,
}

impl HttpFetcher {
    pub fn new(data_base: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            data_base: data_base.into(),
            api_base: api_base.into(),
        }
    }

    async fn get_json(&self, url: String) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::with_source(format!("GET {url} failed"), e))?;
        if !response.status().is_success() {
            return Err(FetchError::new(format!(
                "GET {url} returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| FetchError::with_source(format!("GET {url} returned invalid JSON"), e))
    }
}

impl DataFetcher for HttpFetcher {
    fn fetch_geometry(&self, name: &str) -> BoxFuture<'_, Result<FeatureCollection, FetchError>> {
        let url = format!("{}/geojson/{name}", self.data_base);
        Box::pin(async move {
            let value = self.get_json(url).await?;
            FeatureCollection::from_geojson_value(value)
                .map_err(|e| FetchError::with_source("invalid GeoJSON payload", e))
        })
    }

    fn fetch_ambients(&self) -> BoxFuture<'_, Result<Vec<AmbientRecord>, FetchError>> {
        let url = format!("{}/api/ambients/", self.api_base);
        Box::pin(async move {
            let value = self.get_json(url).await?;
            serde_json::from_value(value)
                .map_err(|e| FetchError::with_source("invalid ambient payload", e))
        })
    }

    fn fetch_assignments(&self) -> BoxFuture<'_, Result<Vec<Assignment>, FetchError>> {
        let url = format!("{}/api/assignments/", self.api_base);
        Box::pin(async move {
            let value = self.get_json(url).await?;
            serde_json::from_value(value)
                .map_err(|e| FetchError::with_source("invalid assignment payload", e))
        })
    }
}
