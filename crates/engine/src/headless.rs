//! Deterministic in-memory `MapSurface`.
//!
//! Backs the test suites and the demo viewer: sources, layers, feature state
//! and the camera live in plain collections, and unprojection is a linear
//! plate-carree viewport so pixel math stays exact.

use std::collections::BTreeMap;

use foundation::geo::LngLat;
use foundation::math::Vec2;
use geodata::geojson::FeatureCollection;

use crate::layer::LayerSpec;
use crate::surface::{
    Cursor, FeatureState, FeatureStateKey, LayoutProperty, MapSurface, RenderedFeature,
    SurfaceError,
};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub center: LngLat,
    /// Degrees of longitude/latitude per pixel.
    pub deg_per_px: f64,
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    pub fn new(center: LngLat, deg_per_px: f64, width_px: f64, height_px: f64) -> Self {
        Self {
            center,
            deg_per_px,
            width_px,
            height_px,
        }
    }

    /// Canvas pixel to geographic coordinates. Pixel y grows downward,
    /// latitude grows upward.
    pub fn unproject(&self, pixel: Vec2) -> LngLat {
        let dx = pixel.x - self.width_px / 2.0;
        let dy = pixel.y - self.height_px / 2.0;
        LngLat::new(
            self.center.lng_deg + dx * self.deg_per_px,
            self.center.lat_deg - dy * self.deg_per_px,
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub center: LngLat,
    pub zoom: f64,
}

#[derive(Debug)]
pub struct HeadlessSurface {
    viewport: Viewport,
    camera: Camera,
    cursor: Cursor,
    sources: BTreeMap<String, FeatureCollection>,
    layers: Vec<LayerSpec>,
    feature_states: BTreeMap<FeatureStateKey, FeatureState>,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport, initial_zoom: f64) -> Self {
        Self {
            viewport,
            camera: Camera {
                center: viewport.center,
                zoom: initial_zoom,
            },
            cursor: Cursor::Default,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            feature_states: BTreeMap::new(),
        }
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn layer(&self, layer_id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == layer_id)
    }

    /// Layer ids in paint order.
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn visible_layer_ids(&self) -> Vec<&str> {
        self.layers
            .iter()
            .filter(|l| l.layout.visible)
            .map(|l| l.id.as_str())
            .collect()
    }

    /// Feature ids of the given source carrying `hover = true`.
    pub fn hovered_feature_ids(&self, source: &str) -> Vec<u64> {
        self.feature_states
            .iter()
            .filter(|(key, state)| key.source == source && state.hover)
            .map(|(key, _)| key.feature_id)
            .collect()
    }

    fn layer_mut(&mut self, layer_id: &str) -> Option<&mut LayerSpec> {
        self.layers.iter_mut().find(|l| l.id == layer_id)
    }
}

impl MapSurface for HeadlessSurface {
    fn add_source(&mut self, key: &str, collection: FeatureCollection) -> Result<(), SurfaceError> {
        if self.sources.contains_key(key) {
            return Err(SurfaceError::DuplicateSource(key.to_string()));
        }
        self.sources.insert(key.to_string(), collection);
        Ok(())
    }

    fn add_layer(&mut self, spec: LayerSpec) -> Result<(), SurfaceError> {
        if !self.sources.contains_key(&spec.source) {
            return Err(SurfaceError::UnknownSource(spec.source.clone()));
        }
        if self.layer(&spec.id).is_some() {
            return Err(SurfaceError::DuplicateLayer(spec.id.clone()));
        }
        self.layers.push(spec);
        Ok(())
    }

    fn set_layout_property(
        &mut self,
        layer_id: &str,
        property: LayoutProperty,
    ) -> Result<(), SurfaceError> {
        let Some(layer) = self.layer_mut(layer_id) else {
            return Err(SurfaceError::UnknownLayer(layer_id.to_string()));
        };
        match property {
            LayoutProperty::Visibility(visible) => layer.layout.visible = visible,
        }
        Ok(())
    }

    fn set_feature_state(&mut self, key: &FeatureStateKey, state: FeatureState) {
        self.feature_states.insert(key.clone(), state);
    }

    fn remove_feature_state(&mut self, key: &FeatureStateKey) {
        self.feature_states.remove(key);
    }

    fn feature_state(&self, key: &FeatureStateKey) -> FeatureState {
        self.feature_states.get(key).copied().unwrap_or_default()
    }

    fn query_rendered_features(&self, layer_id: &str) -> Vec<RenderedFeature> {
        let Some(layer) = self.layer(layer_id) else {
            return Vec::new();
        };
        if !layer.layout.visible {
            return Vec::new();
        }
        let Some(collection) = self.sources.get(&layer.source) else {
            return Vec::new();
        };

        collection
            .features
            .iter()
            .map(|feature| RenderedFeature {
                id: feature.id,
                properties: feature.properties.clone(),
                position: feature.anchor(),
            })
            .collect()
    }

    fn unproject(&self, pixel: Vec2) -> LngLat {
        self.viewport.unproject(pixel)
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        self.camera = Camera { center, zoom };
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }
}
