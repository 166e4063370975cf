//! Configuration for the widget: tile source, mini-map, locate behaviour,
//! points of interest and the page selectors.
//!
//! Every field has a default that reproduces the stock page, so an empty JSON
//! object is a valid configuration.

use crate::{
    core::constants::{
        DEFAULT_CONTAINER_SIZE, MAX_TILE_ZOOM, MINIMAP_SIZE, MINIMAP_ZOOM_OFFSET,
        ON_LOAD_LOCATE_MAX_ZOOM,
    },
    dom::selectors,
    geolocation::LocateOptions,
    layers::tile::{TileLayer, TileLayerOptions},
    tiles::source::{OSM_ATTRIBUTION, OSM_URL_TEMPLATE},
    ui::{controls::Position, sidebar::PointOfInterest},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tile endpoint and its usage terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub url_template: String,
    pub subdomains: Vec<String>,
    pub attribution: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: OSM_URL_TEMPLATE.to_string(),
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            attribution: OSM_ATTRIBUTION.to_string(),
            min_zoom: 0,
            max_zoom: 18,
        }
    }
}

impl TileConfig {
    /// A fresh layer instance; call once per consumer
    pub fn build_layer(&self) -> TileLayer {
        let options = TileLayerOptions {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            attribution: Some(self.attribution.clone()),
            subdomains: self.subdomains.clone(),
            ..Default::default()
        };
        TileLayer::new(self.url_template.clone(), options)
    }
}

/// Inset overview map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniMapConfig {
    pub enabled: bool,
    /// Tiles of the inset; the main tile settings with a narrower zoom range when unset
    pub tile: Option<TileConfig>,
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// Show the show/hide button
    pub toggle_display: bool,
    pub minimized: bool,
    pub position: Position,
    pub width: u32,
    pub height: u32,
    pub zoom_level_offset: f64,
}

impl Default for MiniMapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tile: None,
            min_zoom: 0,
            max_zoom: 13,
            toggle_display: true,
            minimized: false,
            position: Position::BottomRight,
            width: MINIMAP_SIZE.0,
            height: MINIMAP_SIZE.1,
            zoom_level_offset: MINIMAP_ZOOM_OFFSET,
        }
    }
}

impl MiniMapConfig {
    /// Tile settings of the inset given the main map's
    pub fn tile_config(&self, main: &TileConfig) -> TileConfig {
        let mut tile = self.tile.clone().unwrap_or_else(|| main.clone());
        tile.min_zoom = self.min_zoom;
        tile.max_zoom = self.max_zoom;
        tile
    }
}

/// Locate button placement and watch options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocateConfig {
    #[serde(flatten)]
    pub options: LocateOptions,
    pub position: Position,
    /// Tooltip of the button
    pub title: String,
    pub on_load: OnLoadLocateConfig,
}

/// Single position lookup made while the page loads, independent of the button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnLoadLocateConfig {
    pub enabled: bool,
    pub max_zoom: f64,
}

impl Default for OnLoadLocateConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_zoom: ON_LOAD_LOCATE_MAX_ZOOM,
        }
    }
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            options: LocateOptions::default(),
            position: Position::TopLeft,
            title: "locate".to_string(),
            on_load: OnLoadLocateConfig::default(),
        }
    }
}

/// Selectors of the page elements the widget writes into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub map_container: String,
    pub marker_position: String,
    pub routes: String,
    pub description: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            map_container: selectors::MAP_CONTAINER.to_string(),
            marker_position: selectors::MARKER_POSITION.to_string(),
            routes: selectors::ROUTES.to_string(),
            description: selectors::DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub tile: TileConfig,
    pub minimap: MiniMapConfig,
    pub locate: LocateConfig,
    pub points: Vec<PointOfInterest>,
    pub selectors: Selectors,
    /// Container size used until the page reports one
    pub size: (f64, f64),
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile: TileConfig::default(),
            minimap: MiniMapConfig::default(),
            locate: LocateConfig::default(),
            points: vec![PointOfInterest::new(-37.889923, -58.265049, "La Barrosa", 14)],
            selectors: Selectors::default(),
            size: DEFAULT_CONTAINER_SIZE,
        }
    }
}

impl MapConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        log::debug!("loading map config from {}", path.as_ref().display());
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile.min_zoom > self.tile.max_zoom {
            return Err(MapError::Config(format!(
                "tile zoom range {}..{} is empty",
                self.tile.min_zoom, self.tile.max_zoom
            )));
        }
        if self.minimap.min_zoom > self.minimap.max_zoom {
            return Err(MapError::Config(format!(
                "mini-map zoom range {}..{} is empty",
                self.minimap.min_zoom, self.minimap.max_zoom
            )));
        }
        for (name, max_zoom) in [("tile", self.tile.max_zoom), ("mini-map", self.minimap.max_zoom)] {
            if max_zoom > MAX_TILE_ZOOM {
                return Err(MapError::Config(format!(
                    "{name} max zoom {max_zoom} is deeper than {MAX_TILE_ZOOM}"
                )));
            }
        }
        if self.size.0 < 0.0 || self.size.1 < 0.0 {
            return Err(MapError::Config("container size must not be negative".to_string()));
        }

        for point in &self.points {
            if !point.lat_lng().is_valid() {
                return Err(MapError::InvalidCoordinates(format!(
                    "'{}' at {}",
                    point.title,
                    point.lat_lng()
                )));
            }
            if point.zoom < self.tile.min_zoom || point.zoom > self.tile.max_zoom {
                return Err(MapError::Config(format!(
                    "'{}' zoom {} outside {}..{}",
                    point.title, point.zoom, self.tile.min_zoom, self.tile.max_zoom
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_stock_page() {
        let config = MapConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.points.len(), 1);
        assert_eq!(config.points[0].title, "La Barrosa");
        assert_eq!(config.minimap.max_zoom, 13);
        assert!(config.minimap.toggle_display);
        assert!(config.locate.options.enable_high_accuracy);
        assert!(config.locate.options.set_view);
    }

    #[test]
    fn test_points_accept_tuples_and_objects() {
        let config = MapConfig::from_json_str(
            r#"{
                "points": [
                    [-37.889923, -58.265049, "La Barrosa", 14],
                    { "lat": 48.8566, "lng": 2.3522, "title": "Paris", "zoom": 12 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.points.len(), 2);
        assert_eq!(config.points[0].zoom, 14);
        assert_eq!(config.points[1].title, "Paris");
    }

    #[test]
    fn test_locate_options_are_flattened() {
        let config =
            MapConfig::from_json_str(r#"{ "locate": { "max_zoom": 16, "position": "topright" } }"#)
                .unwrap();

        assert_eq!(config.locate.options.max_zoom, Some(16.0));
        assert_eq!(config.locate.position, Position::TopRight);
        assert!(config.locate.options.watch);
        assert!(!config.locate.on_load.enabled);
    }

    #[test]
    fn test_on_load_locate_section() {
        let config =
            MapConfig::from_json_str(r#"{ "locate": { "on_load": { "enabled": true } } }"#).unwrap();
        assert!(config.locate.on_load.enabled);
        assert_eq!(config.locate.on_load.max_zoom, 7.0);
        assert_eq!(config.locate.title, "locate");
    }

    #[test]
    fn test_validation_errors() {
        let bad_point = r#"{ "points": [[95.0, 0.0, "Nowhere", 3]] }"#;
        assert!(matches!(
            MapConfig::from_json_str(bad_point),
            Err(MapError::InvalidCoordinates(_))
        ));

        let bad_zoom = r#"{ "points": [[0.0, 0.0, "Deep", 22]] }"#;
        assert!(matches!(MapConfig::from_json_str(bad_zoom), Err(MapError::Config(_))));

        let too_deep = r#"{ "tile": { "max_zoom": 64 } }"#;
        assert!(matches!(MapConfig::from_json_str(too_deep), Err(MapError::Config(_))));
        let inset_too_deep = r#"{ "minimap": { "max_zoom": 63, "zoom_level_offset": 5.0 } }"#;
        assert!(matches!(MapConfig::from_json_str(inset_too_deep), Err(MapError::Config(_))));

        let bad_range = r#"{ "minimap": { "min_zoom": 9, "max_zoom": 3 } }"#;
        assert!(matches!(MapConfig::from_json_str(bad_range), Err(MapError::Config(_))));

        assert!(matches!(
            MapConfig::from_json_str("not json"),
            Err(MapError::Serialization(_))
        ));
    }

    #[test]
    fn test_minimap_tile_layer_is_narrower() {
        let config = MapConfig::default();
        let inset = config.minimap.tile_config(&config.tile);
        assert_eq!(inset.url_template, config.tile.url_template);
        assert_eq!(inset.max_zoom, 13);
        assert_eq!(inset.build_layer().max_zoom(), 13.0);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            MapConfig::from_file("/definitely/not/here.json"),
            Err(MapError::Io(_))
        ));
    }
}
