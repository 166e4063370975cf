//! Core constants derived from Leaflet defaults and the stock page conventions.
//! Keeping them in a single place makes it easier to tweak widget-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Zoom range of the stock OpenStreetMap layer.
pub const DEFAULT_MIN_ZOOM: f64 = 0.0;
pub const DEFAULT_MAX_ZOOM: f64 = 18.0;

/// Deepest zoom a tile layer may be configured for.
pub const MAX_TILE_ZOOM: u8 = 24;

/// Programmatic +/- zoom step when calling `zoom_in/zoom_out`.
pub const DEFAULT_ZOOM_DELTA: f64 = 1.0;

/// Marker icon default size (regular PNG).
pub const MARKER_ICON_SIZE: (u32, u32) = (25, 41);

/// Anchor inside the icon (hot-spot) in pixel coords.
pub const MARKER_ICON_ANCHOR: (u32, u32) = (12, 41);

/// Where popups open relative to the default marker anchor.
pub const MARKER_POPUP_ANCHOR: (i32, i32) = (1, -34);

/// The accuracy circle is drawn at this fraction of the reported accuracy.
pub const ACCURACY_RADIUS_DIVISOR: f64 = 2.0;

/// Zoom cap of the one-shot locate run when the page loads.
pub const ON_LOAD_LOCATE_MAX_ZOOM: f64 = 7.0;

/// Side of the pulsing "you are here" icon.
pub const LOCATED_ICON_SIZE: u32 = 17;

/// Mini-map inset dimensions in pixels.
pub const MINIMAP_SIZE: (u32, u32) = (150, 150);

/// Mini-map zoom relative to the main map.
pub const MINIMAP_ZOOM_OFFSET: f64 = -5.0;

/// Container size assumed when no page layout is available.
pub const DEFAULT_CONTAINER_SIZE: (f64, f64) = (800.0, 600.0);

/// Pointer travel, in pixels, after which a press counts as a drag instead of a click.
pub const CLICK_TOLERANCE: f64 = 3.0;

/// Stacking of the layer kinds: tiles under vector overlays under markers.
pub const TILE_Z_INDEX: i32 = 200;
pub const OVERLAY_Z_INDEX: i32 = 400;
pub const MARKER_Z_INDEX: i32 = 600;
