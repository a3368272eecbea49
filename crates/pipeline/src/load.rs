use engine::surface::{MapSurface, SurfaceError};
use futures_util::future::join_all;
use geodata::merge::{AmbientIndex, MergeReport, merge_ambients};
use geodata::records::Assignment;
use geodata::registry::{RegistryError, SourceRegistry};
use tracing::{debug, error, info, warn};

use crate::fetch::{DataFetcher, FetchError};

/// Which join treatment a geometry source gets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceClass {
    /// Floor geometry; features are joined against ambient records.
    Floor,
    /// Flat point/line collections registered as-authored.
    Landmarks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryRequest {
    pub key: String,
    pub class: SourceClass,
}

impl GeometryRequest {
    pub fn floor(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            class: SourceClass::Floor,
        }
    }

    pub fn landmarks(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            class: SourceClass::Landmarks,
        }
    }
}

#[derive(Debug)]
pub enum SourceLoadError {
    Fetch(FetchError),
    Register(RegistryError),
    Surface(SurfaceError),
}

impl std::fmt::Display for SourceLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLoadError::Fetch(e) => write!(f, "fetch failed: {e}"),
            SourceLoadError::Register(e) => write!(f, "registration failed: {e}"),
            SourceLoadError::Surface(e) => write!(f, "surface rejected source: {e}"),
        }
    }
}

impl std::error::Error for SourceLoadError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub features: usize,
    /// Present for floor-class sources.
    pub merge: Option<MergeReport>,
}

/// Per-key result of a load pass. Every requested key gets exactly one
/// outcome, so absence of a source is always observable.
#[derive(Debug)]
pub struct SourceOutcome {
    pub key: String,
    pub result: Result<SourceSummary, SourceLoadError>,
}

/// User-visible error channel, decoupled from any UI toolkit.
pub trait AlertSink {
    fn alert(&mut self, message: &str);
}

/// Alert sink that only logs.
#[derive(Debug, Default)]
pub struct LogAlerts;

impl AlertSink for LogAlerts {
    fn alert(&mut self, message: &str) {
        warn!("{message}");
    }
}

/// Loads the ambient attribute set.
///
/// A failed fetch is reported to the user and degrades to an empty index;
/// geometry loading proceeds without names or descriptions.
pub async fn load_attributes(fetcher: &dyn DataFetcher, alerts: &mut dyn AlertSink) -> AmbientIndex {
    match fetcher.fetch_ambients().await {
        Ok(records) => {
            info!(count = records.len(), "loaded ambient records");
            AmbientIndex::from_records(records)
        }
        Err(err) => {
            error!("ambient attribute load failed: {err}");
            alerts.alert("Room information could not be loaded; the map will show geometry only.");
            AmbientIndex::new()
        }
    }
}

/// Loads course assignments; failures degrade to an empty collection.
pub async fn load_assignments(fetcher: &dyn DataFetcher) -> Vec<Assignment> {
    match fetcher.fetch_assignments().await {
        Ok(assignments) => {
            info!(count = assignments.len(), "loaded assignments");
            assignments
        }
        Err(err) => {
            warn!("assignment load failed: {err}");
            Vec::new()
        }
    }
}

/// Fetches every requested geometry source concurrently, joins floor-class
/// features against `ambients` as each fetch resolves, and registers the
/// result under its key in both the registry and the surface.
///
/// Sources succeed or fail independently; one failure never cancels a
/// sibling fetch or hides its outcome.
pub async fn load_and_register_geometry(
    fetcher: &dyn DataFetcher,
    ambients: &AmbientIndex,
    requests: &[GeometryRequest],
    registry: &mut SourceRegistry,
    surface: &mut dyn MapSurface,
) -> Vec<SourceOutcome> {
    let resolved = join_all(requests.iter().map(|req| fetcher.fetch_geometry(&req.key))).await;

    let mut outcomes = Vec::with_capacity(requests.len());
    for (req, fetched) in requests.iter().zip(resolved) {
        let result = match fetched {
            Ok(collection) => register_source(req, collection, ambients, registry, surface),
            Err(err) => {
                warn!(key = req.key.as_str(), "geometry fetch failed: {err}");
                Err(SourceLoadError::Fetch(err))
            }
        };
        outcomes.push(SourceOutcome {
            key: req.key.clone(),
            result,
        });
    }
    outcomes
}

fn register_source(
    req: &GeometryRequest,
    mut collection: geodata::geojson::FeatureCollection,
    ambients: &AmbientIndex,
    registry: &mut SourceRegistry,
    surface: &mut dyn MapSurface,
) -> Result<SourceSummary, SourceLoadError> {
    let merge = match req.class {
        SourceClass::Floor => {
            let report = merge_ambients(&mut collection, ambients);
            for ambient_id in &report.unmatched {
                debug!(
                    key = req.key.as_str(),
                    ambient_id, "no attribute record for feature"
                );
            }
            Some(report)
        }
        SourceClass::Landmarks => None,
    };

    let features = collection.features.len();
    registry
        .register(&req.key, collection.clone())
        .map_err(SourceLoadError::Register)?;
    surface
        .add_source(&req.key, collection)
        .map_err(SourceLoadError::Surface)?;

    info!(key = req.key.as_str(), features, "registered geometry source");
    Ok(SourceSummary { features, merge })
}

/// Everything the application needs after startup data loading.
#[derive(Debug)]
pub struct CampusData {
    pub ambients: AmbientIndex,
    pub assignments: Vec<Assignment>,
    pub outcomes: Vec<SourceOutcome>,
}

/// Full startup load: attributes first (degrading on failure), then all
/// geometry sources concurrently, each joined against whatever attribute set
/// is present at the moment it resolves.
pub async fn load_campus(
    fetcher: &dyn DataFetcher,
    requests: &[GeometryRequest],
    registry: &mut SourceRegistry,
    surface: &mut dyn MapSurface,
    alerts: &mut dyn AlertSink,
) -> CampusData {
    let ambients = load_attributes(fetcher, alerts).await;
    let assignments = load_assignments(fetcher).await;
    let outcomes =
        load_and_register_geometry(fetcher, &ambients, requests, registry, surface).await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    if failed > 0 {
        warn!(failed, total = outcomes.len(), "some geometry sources did not load");
    }

    CampusData {
        ambients,
        assignments,
        outcomes,
    }
}
