#[macro_use]
pub mod macros;

pub mod base;
pub mod group;
pub mod manager;
pub mod marker;
pub mod tile;
pub mod vector;

pub use base::{LayerId, LayerProperties, LayerTrait, LayerType};
pub use group::FeatureGroup;
pub use manager::LayerManager;
pub use marker::{DivIcon, Icon, Marker};
pub use tile::{TileLayer, TileLayerOptions, VisibleTile};
pub use vector::{Circle, PathStyle};
