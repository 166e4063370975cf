//! Raster tile layer driven by a URL template

use crate::{
    core::{
        constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, MAX_TILE_ZOOM, TILE_SIZE, TILE_Z_INDEX},
        geo::{Point, TileCoord},
        viewport::Viewport,
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
    tiles::source::{TileSource, UrlTemplateSource, OSM_ATTRIBUTION},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerOptions {
    pub tile_size: u32,
    pub min_zoom: u8,
    pub max_zoom: u8,
    pub attribution: Option<String>,
    pub subdomains: Vec<String>,
    pub opacity: f32,
    pub z_index: i32,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            min_zoom: DEFAULT_MIN_ZOOM as u8,
            max_zoom: DEFAULT_MAX_ZOOM as u8,
            attribution: None,
            subdomains: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            opacity: 1.0,
            z_index: TILE_Z_INDEX,
        }
    }
}

/// One tile needed to cover the current view
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    pub url: String,
    /// Top-left corner relative to the map container
    pub offset: Point,
    /// Displayed edge length in pixels (differs from the tile size at fractional zooms)
    pub size: f64,
}

/// Tile layer that loads images from a templated endpoint.
///
/// Each instance is owned by exactly one consumer (the main map or a mini-map);
/// two consumers need two instances.
pub struct TileLayer {
    properties: LayerProperties,
    source: UrlTemplateSource,
    options: TileLayerOptions,
}

impl TileLayer {
    pub fn new(url_template: impl Into<String>, options: TileLayerOptions) -> Self {
        let mut properties = LayerProperties::new("Tile Layer".to_string(), LayerType::Tile);
        properties.z_index = options.z_index;
        properties.opacity = options.opacity;

        Self {
            properties,
            source: UrlTemplateSource::new(url_template, options.subdomains.clone()),
            options,
        }
    }

    /// The stock OpenStreetMap layer with its required attribution
    pub fn openstreetmap() -> Self {
        let options = TileLayerOptions {
            attribution: Some(OSM_ATTRIBUTION.to_string()),
            ..Default::default()
        };
        Self::new(UrlTemplateSource::openstreetmap().template(), options)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = name.into();
        self
    }

    pub fn url_template(&self) -> &str {
        self.source.template()
    }

    pub fn attribution(&self) -> Option<&str> {
        self.options.attribution.as_deref()
    }

    pub fn min_zoom(&self) -> f64 {
        self.options.min_zoom as f64
    }

    pub fn max_zoom(&self) -> f64 {
        self.options.max_zoom as f64
    }

    pub fn tile_options(&self) -> &TileLayerOptions {
        &self.options
    }

    pub fn tile_url(&self, coord: TileCoord) -> String {
        self.source.url(coord)
    }

    /// Tiles covering `viewport`, or none when the view zoom is outside the layer range
    pub fn visible_tiles(&self, viewport: &Viewport) -> Vec<VisibleTile> {
        let tile_zoom = viewport.zoom.round();
        let max_zoom = self.max_zoom().min(MAX_TILE_ZOOM as f64);
        if tile_zoom < self.min_zoom() || tile_zoom > max_zoom {
            return Vec::new();
        }

        let z = tile_zoom as u8;
        let tile_px = self.options.tile_size as f64 * 2_f64.powf(viewport.zoom - tile_zoom);
        if tile_px <= 0.0 {
            return Vec::new();
        }

        let (top_left, bottom_right) = viewport.pixel_bounds();
        let min_x = (top_left.x / tile_px).floor() as i64;
        let max_x = ((bottom_right.x - 1e-9) / tile_px).floor() as i64;
        let min_y = (top_left.y / tile_px).floor() as i64;
        let max_y = ((bottom_right.y - 1e-9) / tile_px).floor() as i64;
        let tiles_per_axis = 1_i64 << z;

        let mut tiles = Vec::new();
        for y in min_y..=max_y {
            if y < 0 || y >= tiles_per_axis {
                continue;
            }
            for x in min_x..=max_x {
                let coord = TileCoord::new(x.rem_euclid(tiles_per_axis) as u32, y as u32, z);
                let offset = Point::new(
                    x as f64 * tile_px - top_left.x,
                    y as f64 * tile_px - top_left.y,
                );
                tiles.push(VisibleTile {
                    coord,
                    url: self.source.url(coord),
                    offset,
                    size: tile_px,
                });
            }
        }

        log::trace!("{} tiles visible at zoom {}", tiles.len(), z);
        tiles
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.source.template(),
            "tile_size": self.options.tile_size,
            "min_zoom": self.options.min_zoom,
            "max_zoom": self.options.max_zoom,
            "attribution": self.options.attribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    #[test]
    fn test_world_view_tiles() {
        let layer = TileLayer::openstreetmap();
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(800.0, 600.0));
        viewport.fit_world();

        let tiles = layer.visible_tiles(&viewport);
        // 512px world at zoom 1 inside 800x600 needs the four zoom-1 tiles,
        // with the horizontal overflow wrapping around
        assert!(tiles.iter().all(|t| t.coord.z == 1 && t.coord.is_valid()));
        assert!(tiles.len() >= 4);
        assert!(tiles
            .iter()
            .any(|t| t.url == "https://a.tile.openstreetmap.org/1/0/0.png"));
    }

    #[test]
    fn test_no_tiles_outside_zoom_range() {
        let options = TileLayerOptions {
            max_zoom: 13,
            ..Default::default()
        };
        let layer = TileLayer::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", options);
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 15.0, Point::new(256.0, 256.0));

        assert!(layer.visible_tiles(&viewport).is_empty());
    }

    #[test]
    fn test_zoom_beyond_tile_pyramid_draws_nothing() {
        let options = TileLayerOptions {
            max_zoom: 70,
            ..Default::default()
        };
        let layer = TileLayer::new("https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png", options);
        let mut viewport = Viewport::new(LatLng::new(0.0, 0.0), 0.0, Point::new(256.0, 256.0));
        viewport.set_zoom_limits(0.0, 70.0);
        viewport.set_zoom(64.0);

        assert!(layer.visible_tiles(&viewport).is_empty());
    }

    #[test]
    fn test_tile_offsets_cover_container() {
        let layer = TileLayer::openstreetmap();
        let viewport = Viewport::new(LatLng::new(-37.889923, -58.265049), 14.0, Point::new(300.0, 200.0));
        let tiles = layer.visible_tiles(&viewport);

        assert!(!tiles.is_empty());
        for tile in &tiles {
            assert_eq!(tile.size, 256.0);
            assert!(tile.offset.x < 300.0 && tile.offset.x + tile.size > 0.0);
            assert!(tile.offset.y < 200.0 && tile.offset.y + tile.size > 0.0);
        }
    }

    #[test]
    fn test_openstreetmap_has_attribution() {
        let layer = TileLayer::openstreetmap();
        assert!(layer.attribution().unwrap().contains("OpenStreetMap"));
        assert_eq!(layer.layer_type(), LayerType::Tile);
    }
}
