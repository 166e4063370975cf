//! Fluent construction of a [`MapApp`]
//!
//! Starts from the stock page configuration (or a JSON file) and lets callers
//! override tiles, points, the mini-map and the locate behaviour before
//! binding the widget to a document and a location service.

use crate::{
    app::MapApp,
    core::{
        config::{MapConfig, Selectors, TileConfig},
        map::MapOptions,
    },
    dom::Document,
    geolocation::{GeolocationService, LocateOptions},
    ui::{controls::Position, sidebar::PointOfInterest},
    Result,
};
use std::path::Path;

/// Builder for creating and configuring [`MapApp`] instances
#[derive(Debug, Clone, Default)]
pub struct MapAppBuilder {
    config: MapConfig,
    map_options: MapOptions,
}

impl MapAppBuilder {
    /// A builder for the stock page
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: MapConfig) -> Self {
        Self {
            config,
            map_options: MapOptions::default(),
        }
    }

    /// Loads the configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_config(MapConfig::from_file(path)?))
    }

    /// Replace the points of interest
    pub fn with_points(mut self, points: Vec<PointOfInterest>) -> Self {
        self.config.points = points;
        self
    }

    /// Append one point of interest
    pub fn with_point(mut self, point: PointOfInterest) -> Self {
        self.config.points.push(point);
        self
    }

    /// Set the base tile source
    pub fn with_tiles(mut self, tile: TileConfig) -> Self {
        self.config.tile = tile;
        self
    }

    /// Set the tile URL template and its attribution
    pub fn with_tile_url(
        mut self,
        url_template: impl Into<String>,
        attribution: impl Into<String>,
    ) -> Self {
        self.config.tile.url_template = url_template.into();
        self.config.tile.attribution = attribution.into();
        self
    }

    /// Enable or disable the mini-map
    pub fn with_minimap(mut self, enabled: bool) -> Self {
        self.config.minimap.enabled = enabled;
        self
    }

    /// Zoom range of the mini-map tiles
    pub fn with_minimap_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.config.minimap.min_zoom = min_zoom;
        self.config.minimap.max_zoom = max_zoom;
        self
    }

    pub fn with_locate_options(mut self, options: LocateOptions) -> Self {
        self.config.locate.options = options;
        self
    }

    /// Cap the zoom the view jumps to on a location fix
    pub fn with_locate_max_zoom(mut self, max_zoom: f64) -> Self {
        self.config.locate.options.max_zoom = Some(max_zoom);
        self
    }

    /// Look the position up once while the page loads
    pub fn with_locate_on_load(mut self, enabled: bool) -> Self {
        self.config.locate.on_load.enabled = enabled;
        self
    }

    pub fn with_locate_position(mut self, position: Position) -> Self {
        self.config.locate.position = position;
        self
    }

    pub fn with_selectors(mut self, selectors: Selectors) -> Self {
        self.config.selectors = selectors;
        self
    }

    /// Container size used until the page reports one
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.config.size = (width, height);
        self
    }

    /// Set zoom limits of the main map
    pub fn with_zoom_limits(mut self, min_zoom: f64, max_zoom: f64) -> Self {
        self.map_options.min_zoom = Some(min_zoom);
        self.map_options.max_zoom = Some(max_zoom);
        self
    }

    /// Enable or disable the zoom buttons
    pub fn with_zoom_control(mut self, enabled: bool) -> Self {
        self.map_options.zoom_control = enabled;
        self
    }

    /// Enable or disable the attribution control
    pub fn with_attribution_control(mut self, enabled: bool) -> Self {
        self.map_options.attribution_control = enabled;
        self
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Binds the widget to `doc` and `geolocation` and draws the first frame
    pub fn build<D, G>(self, doc: D, geolocation: G) -> Result<MapApp<D, G>>
    where
        D: Document,
        G: GeolocationService,
    {
        log::debug!(
            "building map app: {} points, mini-map {}",
            self.config.points.len(),
            if self.config.minimap.enabled { "on" } else { "off" }
        );
        MapApp::with_options(self.config, self.map_options, doc, geolocation)
    }
}
