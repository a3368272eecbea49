use serde_json::{Map, Value};

/// Data-driven color: either a constant or a categorical mapping over one
/// property, with a fallback for unmapped values.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorExpr {
    Constant(String),
    ByCategory {
        property: String,
        mapping: Vec<(String, String)>,
        default: String,
    },
}

impl ColorExpr {
    pub fn resolve(&self, properties: &Map<String, Value>) -> &str {
        match self {
            ColorExpr::Constant(color) => color,
            ColorExpr::ByCategory {
                property,
                mapping,
                default,
            } => {
                let Some(value) = properties.get(property).and_then(|v| v.as_str()) else {
                    return default;
                };
                mapping
                    .iter()
                    .find(|(category, _)| category == value)
                    .map(|(_, color)| color.as_str())
                    .unwrap_or(default)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: ColorExpr,
    pub opacity: f64,
}

impl Paint {
    pub fn constant(color: impl Into<String>, opacity: f64) -> Self {
        Self {
            color: ColorExpr::Constant(color.into()),
            opacity,
        }
    }
}
