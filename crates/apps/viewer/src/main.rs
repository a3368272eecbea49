mod http;

use std::env;

use engine::headless::{HeadlessSurface, Viewport};
use engine::layer::{LayerSpec, LayerType};
use engine::symbology::Paint;
use foundation::geo::LngLat;
use geodata::records::AmbientRecord;
use geodata::registry::SourceRegistry;
use geodata::search::search_ambients;
use interact::drag::DragController;
use interact::floors::{FloorManager, FloorStyle};
use interact::group::LayerGroup;
use pipeline::load::{CampusData, GeometryRequest, LogAlerts, load_campus};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::http::HttpFetcher;

const CAMPUS_CENTER: LngLat = LngLat {
    lng_deg: -77.0854458,
    lat_deg: -12.0530102,
};
const INITIAL_ZOOM: f64 = 18.0;
const VIEWPORT_DEG_PER_PX: f64 = 0.000005;
const VIEWPORT_WIDTH_PX: f64 = 1280.0;
const VIEWPORT_HEIGHT_PX: f64 = 720.0;

const FLOOR_KEYS: [&str; 3] = ["level1", "level2", "level3"];
const PANORAMA_SOURCE: &str = "panoramas";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data_base =
        env::var("CAMPUS_DATA_URL").unwrap_or_else(|_| "http://127.0.0.1:9000".to_string());
    let api_base = env::var("CAMPUS_API_URL").unwrap_or_else(|_| data_base.clone());
    info!(data_base, api_base, "starting campus viewer");

    let fetcher = HttpFetcher::new(data_base, api_base);
    let mut surface = HeadlessSurface::new(
        Viewport::new(
            CAMPUS_CENTER,
            VIEWPORT_DEG_PER_PX,
            VIEWPORT_WIDTH_PX,
            VIEWPORT_HEIGHT_PX,
        ),
        INITIAL_ZOOM,
    );
    let mut registry = SourceRegistry::new();
    let mut alerts = LogAlerts;

    let mut requests: Vec<GeometryRequest> = FLOOR_KEYS
        .iter()
        .map(|key| GeometryRequest::floor(*key))
        .collect();
    requests.push(GeometryRequest::landmarks(PANORAMA_SOURCE));

    let data = load_campus(
        &fetcher,
        &requests,
        &mut registry,
        &mut surface,
        &mut alerts,
    )
    .await;

    for outcome in &data.outcomes {
        match &outcome.result {
            Ok(summary) => info!(
                key = outcome.key.as_str(),
                features = summary.features,
                "source ready"
            ),
            Err(err) => warn!(key = outcome.key.as_str(), "source unavailable: {err}"),
        }
    }

    let available: Vec<&str> = FLOOR_KEYS
        .iter()
        .copied()
        .filter(|key| registry.contains(key))
        .collect();
    let Some(initial) = available.first().copied() else {
        error!("no floor geometry loaded; nothing to show");
        return;
    };

    let mut floors = FloorManager::new();
    if let Err(err) = floors.load(
        &mut surface,
        &registry,
        &available,
        initial,
        &FloorStyle::default(),
    ) {
        error!("floor setup failed: {err}");
        return;
    }
    info!(
        floors = available.len(),
        active = initial,
        "floor plan ready"
    );

    let drag = match setup_panorama_drag(&mut surface) {
        Ok(drag) => Some(drag),
        Err(err) => {
            warn!("panorama drag unavailable: {err}");
            None
        }
    };

    info!(
        ambients = data.ambients.len(),
        assignments = data.assignments.len(),
        drag_ready = drag.is_some(),
        "campus viewer initialized"
    );

    if let Ok(query) = env::var("CAMPUS_SEARCH") {
        run_search(&query, &data, &mut floors, &mut surface, &registry);
    }
}

/// Resolves a startup search query the way the search bar does: substring
/// match over ambient names and descriptions, then fly to the first hit.
fn run_search(
    query: &str,
    data: &CampusData,
    floors: &mut FloorManager,
    surface: &mut HeadlessSurface,
    registry: &SourceRegistry,
) {
    let records: Vec<AmbientRecord> = data.ambients.records().cloned().collect();
    let hits = search_ambients(&records, query);
    info!(query, hits = hits.len(), "search complete");

    let Some(hit) = hits.first() else {
        return;
    };
    match floors.fly_to_ambient(surface, registry, &hit.ambient_id) {
        Ok(true) => info!(
            ambient = hit.ambient_id.as_str(),
            floor = floors.active_floor(),
            "focused first search hit"
        ),
        Ok(false) => warn!(
            ambient = hit.ambient_id.as_str(),
            "search hit has no floor feature"
        ),
        Err(err) => warn!("search navigation failed: {err}"),
    }
}

/// Builds the hidden candidate point layer the drag engine queries and
/// returns a controller bound to it.
fn setup_panorama_drag(
    surface: &mut HeadlessSurface,
) -> Result<DragController, Box<dyn std::error::Error>> {
    let mut group = LayerGroup::new(PANORAMA_SOURCE, PANORAMA_SOURCE, false);
    group.push_layer(
        "points",
        LayerSpec::new(LayerType::Circle, Paint::constant("#d9534a", 1.0)),
    );
    group.add_to_map(surface)?;

    let layer_id = group.layer_id_by_type(LayerType::Circle)?.to_string();
    Ok(DragController::new(layer_id))
}
