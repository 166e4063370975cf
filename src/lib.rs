//! # mapnav
//!
//! An interactive map widget in the spirit of Leaflet pages: a tiled base map,
//! an inset mini-map, a locate button that follows the user's position with an
//! accuracy circle, a sidebar of points of interest and a last-click readout.
//!
//! The map surface (viewport, layers, controls) is plain Rust. The page is
//! reached through the [`dom::Document`] trait and positions arrive through
//! [`geolocation::GeolocationService`], so the whole widget runs natively
//! against [`dom::MemoryDocument`] and in the browser with the `wasm` feature.

pub mod app;
pub mod core;
pub mod dom;
pub mod geolocation;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub mod traits;
pub mod ui;

#[cfg(feature = "wasm")]
pub mod web;

pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    builder::MapAppBuilder,
    config::MapConfig,
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::{LayerId, Map},
    viewport::Viewport,
};

pub use app::MapApp;

pub use dom::{Document, ElementId, MemoryDocument};

pub use geolocation::{
    GeolocationService, LocateOptions, LocationError, LocationErrorCode, LocationFix,
    ManualGeolocation,
};

pub use input::{AppEvent, MapEvent};

pub use layers::{
    base::LayerTrait, group::FeatureGroup, marker::Marker, tile::TileLayer, vector::Circle,
};

pub use ui::{
    locate::{InitialLocate, LocateControl, LocateState},
    minimap::MiniMap,
    readout::ClickReadout,
    sidebar::{PoiSidebar, PointOfInterest},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Missing page element: {selector}")]
    MissingElement { selector: String },

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("Unknown sidebar entry: {0}")]
    UnknownEntry(String),
}

/// Error type alias for convenience
pub type Error = MapError;
