use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::traits::LayerOperations as LayerTrait;

/// Identifier the map surface stamps on every layer it accepts.
///
/// Identifiers increase monotonically and are never reused, so they are safe
/// to hand out to the page (sidebar links carry them as element ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LayerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(LayerId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Tile,
    Marker,
    Circle,
    Custom,
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tile => "tile",
            Self::Marker => "marker",
            Self::Circle => "circle",
            Self::Custom => "custom",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
    /// CSS class tag, used by the page stylesheet
    pub class_name: Option<String>,
}

impl LayerProperties {
    pub fn new(name: String, layer_type: LayerType) -> Self {
        Self {
            name,
            layer_type,
            z_index: 0,
            opacity: 1.0,
            visible: true,
            class_name: None,
        }
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

impl Default for LayerProperties {
    fn default() -> Self {
        Self::new("Default Layer".to_string(), LayerType::Custom)
    }
}
