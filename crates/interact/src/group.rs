use engine::layer::{LayerSpec, LayerType};
use engine::surface::{LayoutProperty, MapSurface, SurfaceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    NoLayerOfType {
        group_id: String,
        layer_type: LayerType,
    },
}

impl std::fmt::Display for GroupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupError::NoLayerOfType {
                group_id,
                layer_type,
            } => write!(f, "no {layer_type} layer in group {group_id:?}"),
        }
    }
}

impl std::error::Error for GroupError {}

/// The bundle of rendering layers that jointly represent one logical floor.
///
/// Callers never touch individual rendering layers: specs are pushed by
/// name, stamped with a derived id (`"{group_id}.{layer_name}"`), the
/// group's source key, and the group's visibility, then registered with the
/// surface as one batch in insertion order (fill below outline below
/// labels). Layers pushed after `add_to_map` are not retroactively added.
#[derive(Debug)]
pub struct LayerGroup {
    group_id: String,
    source_key: String,
    is_visible: bool,
    layers: Vec<(String, LayerSpec)>,
}

impl LayerGroup {
    pub fn new(
        group_id: impl Into<String>,
        source_key: impl Into<String>,
        is_visible: bool,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            source_key: source_key.into(),
            is_visible,
            layers: Vec::new(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// The rendering id a layer of this group gets for `layer_name`.
    pub fn layer_id_for(&self, layer_name: &str) -> String {
        format!("{}.{layer_name}", self.group_id)
    }

    pub fn push_layer(&mut self, layer_name: &str, mut spec: LayerSpec) {
        spec.id = self.layer_id_for(layer_name);
        spec.source = self.source_key.clone();
        spec.layout.visible = self.is_visible;
        self.layers.push((layer_name.to_string(), spec));
    }

    /// Registers every pushed layer with the surface, in insertion order.
    pub fn add_to_map(&self, surface: &mut dyn MapSurface) -> Result<(), SurfaceError> {
        for (_name, spec) in &self.layers {
            surface.add_layer(spec.clone())?;
        }
        Ok(())
    }

    /// Flips visibility on every owned layer; other groups' layers are
    /// untouched even when they share this group's source key.
    pub fn set_visible(
        &mut self,
        surface: &mut dyn MapSurface,
        visible: bool,
    ) -> Result<(), SurfaceError> {
        self.is_visible = visible;
        for (_name, spec) in &self.layers {
            surface.set_layout_property(&spec.id, LayoutProperty::Visibility(visible))?;
        }
        Ok(())
    }

    /// Flips the group between shown and hidden.
    pub fn toggle_visible(&mut self, surface: &mut dyn MapSurface) -> Result<(), SurfaceError> {
        self.set_visible(surface, !self.is_visible)
    }

    pub fn layer_id_by_name(&self, layer_name: &str) -> Option<&str> {
        self.layers
            .iter()
            .find(|(name, _)| name == layer_name)
            .map(|(_, spec)| spec.id.as_str())
    }

    /// Rendering id of the first layer of the given type, in insertion
    /// order. Groups are expected to hold one layer per semantic type.
    pub fn layer_id_by_type(&self, layer_type: LayerType) -> Result<&str, GroupError> {
        self.layers
            .iter()
            .find(|(_, spec)| spec.layer_type == layer_type)
            .map(|(_, spec)| spec.id.as_str())
            .ok_or_else(|| GroupError::NoLayerOfType {
                group_id: self.group_id.clone(),
                layer_type,
            })
    }
}
