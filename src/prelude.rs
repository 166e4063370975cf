//! Prelude module for common mapnav types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapnav::prelude::*;`

pub use crate::core::{
    builder::MapAppBuilder,
    config::{LocateConfig, MapConfig, MiniMapConfig, Selectors, TileConfig},
    geo::{LatLng, LatLngBounds, Point, TileCoord},
    map::Map,
    viewport::Viewport,
};

pub use crate::layers::{
    base::{LayerId, LayerTrait, LayerType},
    group::FeatureGroup,
    manager::LayerManager,
    marker::{DivIcon, Icon, Marker},
    tile::TileLayer,
    vector::{Circle, PathStyle},
};

pub use crate::input::{AppEvent, EventManager, MapEvent};

pub use crate::geolocation::{
    GeolocationService, LocateOptions, LocationError, LocationErrorCode, LocationFix,
    ManualGeolocation, WatchId,
};

pub use crate::dom::{Document, ElementId, MemoryDocument};

pub use crate::ui::{
    controls::{ControlManager, Position},
    locate::{LocateControl, LocateState},
    minimap::MiniMap,
    readout::ClickReadout,
    sidebar::{PoiSidebar, PointOfInterest},
};

pub use crate::app::MapApp;

pub use crate::{Error as MapError, Result};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
