use foundation::geo::LngLat;
use foundation::math::Vec2;
use geodata::geojson::FeatureCollection;
use serde_json::{Map, Value};

use crate::layer::LayerSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    DuplicateSource(String),
    UnknownSource(String),
    DuplicateLayer(String),
    UnknownLayer(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::DuplicateSource(key) => write!(f, "source {key:?} already added"),
            SurfaceError::UnknownSource(key) => write!(f, "source {key:?} not added"),
            SurfaceError::DuplicateLayer(id) => write!(f, "layer {id:?} already added"),
            SurfaceError::UnknownLayer(id) => write!(f, "layer {id:?} not added"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Addresses one feature's renderer-side state: source plus stable id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FeatureStateKey {
    pub source: String,
    pub feature_id: u64,
}

impl FeatureStateKey {
    pub fn new(source: impl Into<String>, feature_id: u64) -> Self {
        Self {
            source: source.into(),
            feature_id,
        }
    }
}

/// Ephemeral renderer-side annotation, distinct from feature properties.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FeatureState {
    pub hover: bool,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LayoutProperty {
    Visibility(bool),
}

/// A feature as returned by a rendered-features query.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    pub id: Option<u64>,
    pub properties: Map<String, Value>,
    /// Anchor coordinate; `None` for geometry without a usable anchor.
    pub position: Option<LngLat>,
}

impl RenderedFeature {
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }
}

/// Capability boundary to the rendering engine.
///
/// The interaction core holds a `MapSurface` by reference instead of
/// extending any concrete engine type; anything with these operations can
/// host it, including the headless surface used in tests.
pub trait MapSurface {
    fn add_source(&mut self, key: &str, collection: FeatureCollection) -> Result<(), SurfaceError>;

    fn add_layer(&mut self, spec: LayerSpec) -> Result<(), SurfaceError>;

    fn set_layout_property(
        &mut self,
        layer_id: &str,
        property: LayoutProperty,
    ) -> Result<(), SurfaceError>;

    fn set_feature_state(&mut self, key: &FeatureStateKey, state: FeatureState);

    fn remove_feature_state(&mut self, key: &FeatureStateKey);

    fn feature_state(&self, key: &FeatureStateKey) -> FeatureState;

    /// Features of the given layer currently eligible for rendering.
    /// Hidden layers yield an empty result.
    fn query_rendered_features(&self, layer_id: &str) -> Vec<RenderedFeature>;

    /// Canvas-relative pixel position to geographic coordinates.
    fn unproject(&self, pixel: Vec2) -> LngLat;

    fn fly_to(&mut self, center: LngLat, zoom: f64);

    fn set_cursor(&mut self, cursor: Cursor);
}
