use crate::{
    core::geo::{LatLng, Point},
    geolocation::{LocationError, LocationFix},
    layers::base::LayerId,
};

/// Map event types that can be emitted by the map surface
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Direct click on the map surface
    Click { lat_lng: LatLng, pixel: Point },
    /// Layer was added to the map
    LayerAdd { layer_id: LayerId },
    /// Layer was removed from the map
    LayerRemove { layer_id: LayerId },
    /// A position fix arrived while locating
    LocationFound(LocationFix),
    /// Locating failed while locating
    LocationError(LocationError),
    /// A marker's bound popup was opened
    PopupOpen { layer_id: LayerId },
    /// The open popup was closed
    PopupClose { layer_id: LayerId },
}

impl MapEvent {
    /// Listener key for this event
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::Click { .. } => "click",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::LocationFound(_) => "locationfound",
            MapEvent::LocationError(_) => "locationerror",
            MapEvent::PopupOpen { .. } => "popupopen",
            MapEvent::PopupClose { .. } => "popupclose",
        }
    }
}

/// Everything the widget reacts to: page interactions and platform callbacks
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Click on the bare map, in container pixels
    MapClick { pixel: Point },
    /// Click on the locate button
    LocateButtonClick,
    /// Click on a sidebar link, identified by its marker id
    SidebarLinkClick { marker_id: LayerId },
    /// Click on a marker on the map
    MarkerClick { marker_id: LayerId },
    /// Show/hide button of the mini-map
    MiniMapToggle,
    ZoomIn,
    ZoomOut,
    /// Drag of the map by a pixel offset
    Pan { offset: Point },
    /// Map container was resized
    Resize { size: Point },
    LocationFound(LocationFix),
    LocationError(LocationError),
}
