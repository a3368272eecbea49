use crate::symbology::Paint;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerType {
    Fill,
    Line,
    Symbol,
    Circle,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LayerType::Fill => "fill",
            LayerType::Line => "line",
            LayerType::Symbol => "symbol",
            LayerType::Circle => "circle",
        };
        write!(f, "{name}")
    }
}

/// Layout state stamped onto a layer before it is ever rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub visible: bool,
    /// Property key symbol layers render as their label text.
    pub text_field: Option<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            visible: true,
            text_field: None,
        }
    }
}

/// One rendering layer definition.
///
/// `id` and `source` are stamped by the owning layer group; a spec is built
/// with them empty and is not valid to add until stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub layer_type: LayerType,
    pub layout: Layout,
    pub paint: Paint,
}

impl LayerSpec {
    pub fn new(layer_type: LayerType, paint: Paint) -> Self {
        Self {
            id: String::new(),
            source: String::new(),
            layer_type,
            layout: Layout::default(),
            paint,
        }
    }

    pub fn with_text_field(mut self, property: impl Into<String>) -> Self {
        self.layout.text_field = Some(property.into());
        self
    }
}
