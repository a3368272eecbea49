use engine::surface::{Cursor, FeatureState, FeatureStateKey, MapSurface, RenderedFeature};

/// Hover affordance for one interactive layer.
///
/// Invariant: at most one feature of the layer carries `hover = true` at any
/// time. Transitions clear the previous feature's state before the next one
/// is set, so two features are never lit simultaneously, even transiently.
#[derive(Debug)]
pub struct HoverCache {
    source_key: String,
    layer_id: String,
    current: Option<u64>,
}

impl HoverCache {
    pub fn new(source_key: impl Into<String>, layer_id: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            layer_id: layer_id.into(),
            current: None,
        }
    }

    pub fn layer_id(&self) -> &str {
        &self.layer_id
    }

    pub fn current(&self) -> Option<u64> {
        self.current
    }

    /// Pointer motion over the layer with the features under the cursor.
    ///
    /// Features without a stable id cannot hold feature-state and are
    /// skipped. Re-entering the already-hovered feature is a no-op.
    pub fn pointer_move(&mut self, surface: &mut dyn MapSurface, hits: &[RenderedFeature]) {
        let Some(next) = hits.iter().find_map(|f| f.id) else {
            return;
        };
        if self.current == Some(next) {
            return;
        }

        if let Some(prev) = self.current.take() {
            surface.set_feature_state(
                &FeatureStateKey::new(self.source_key.as_str(), prev),
                FeatureState { hover: false },
            );
        }
        surface.set_feature_state(
            &FeatureStateKey::new(self.source_key.as_str(), next),
            FeatureState { hover: true },
        );
        self.current = Some(next);
        surface.set_cursor(Cursor::Pointer);
    }

    /// Pointer left the layer: drop any hover state and restore the cursor.
    pub fn pointer_leave(&mut self, surface: &mut dyn MapSurface) {
        if let Some(prev) = self.current.take() {
            surface.remove_feature_state(&FeatureStateKey::new(self.source_key.as_str(), prev));
        }
        surface.set_cursor(Cursor::Default);
    }
}
