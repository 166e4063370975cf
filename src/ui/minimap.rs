//! Inset overview map that follows the main view at a coarser zoom

use crate::{
    core::{
        config::MiniMapConfig,
        geo::{LatLngBounds, Point},
        map::Map,
        viewport::Viewport,
    },
    dom::{Document, ElementId},
    layers::tile::{TileLayer, VisibleTile},
    ui::controls::Position,
    Result,
};

/// Collapsed edge length when hidden
const MINIMIZED_SIZE: f64 = 19.0;

/// Overview inset with its own tile layer instance.
///
/// The layer is moved in, so the same instance can never also be drawn by the
/// main map.
pub struct MiniMap {
    layer: TileLayer,
    position: Position,
    size: Point,
    zoom_level_offset: f64,
    toggle_display: bool,
    minimized: bool,
    viewport: Viewport,
    aiming_rect: LatLngBounds,
    element: Option<ElementId>,
    toggle: Option<ElementId>,
}

impl MiniMap {
    pub const NAME: &'static str = "minimap";
    pub const TOGGLE_CLASS: &'static str = "minimap-toggle-display";
    const MINIMIZED_CLASS: &'static str = "minimap-minimized";

    pub fn new(layer: TileLayer, config: &MiniMapConfig) -> Self {
        let size = Point::new(config.width as f64, config.height as f64);
        let mut viewport = Viewport::new(Default::default(), 0.0, size);
        viewport.set_zoom_limits(layer.min_zoom(), layer.max_zoom());

        Self {
            layer,
            position: config.position,
            size,
            zoom_level_offset: config.zoom_level_offset,
            toggle_display: config.toggle_display,
            minimized: config.minimized,
            aiming_rect: viewport.bounds(),
            viewport,
            element: None,
            toggle: None,
        }
    }

    /// Creates the inset control on the map and aligns it with the main view
    pub fn mount(&mut self, map: &mut Map, doc: &mut dyn Document) -> Result<()> {
        let element = map.controls_mut().create_control(
            doc,
            Self::NAME,
            self.position,
            "map-control-minimap",
        )?;
        if self.toggle_display {
            let toggle = doc.create_child(element, "a", Self::TOGGLE_CLASS)?;
            doc.set_attribute(toggle, "href", "#")?;
            doc.set_attribute(toggle, "title", "Hide MiniMap")?;
            self.toggle = Some(toggle);
        }
        self.element = Some(element);

        self.sync(map.viewport());
        self.apply_state(doc)
    }

    /// Follows the main view
    pub fn sync(&mut self, main: &Viewport) {
        let zoom = main.zoom + self.zoom_level_offset;
        self.viewport.set_size(self.size);
        self.viewport.set_view(main.center, zoom);
        self.aiming_rect = main.bounds();
    }

    /// Show/hide button; returns whether the inset is now minimized
    pub fn toggle_display(&mut self, doc: &mut dyn Document) -> Result<bool> {
        if !self.toggle_display {
            return Ok(self.minimized);
        }
        self.minimized = !self.minimized;
        log::debug!("mini-map minimized: {}", self.minimized);
        self.apply_state(doc)?;
        Ok(self.minimized)
    }

    fn apply_state(&self, doc: &mut dyn Document) -> Result<()> {
        let Some(element) = self.element else {
            return Ok(());
        };
        let (width, height) = if self.minimized {
            (MINIMIZED_SIZE, MINIMIZED_SIZE)
        } else {
            (self.size.x, self.size.y)
        };
        doc.set_attribute(
            element,
            "style",
            &format!("width: {width}px; height: {height}px;"),
        )?;

        if self.minimized {
            doc.add_class(element, Self::MINIMIZED_CLASS)?;
        } else {
            doc.remove_class(element, Self::MINIMIZED_CLASS)?;
        }
        if let Some(toggle) = self.toggle {
            let title = if self.minimized { "Show MiniMap" } else { "Hide MiniMap" };
            doc.set_attribute(toggle, "title", title)?;
        }
        Ok(())
    }

    /// Tiles to draw inside the inset; none while minimized
    pub fn visible_tiles(&self) -> Vec<VisibleTile> {
        if self.minimized {
            return Vec::new();
        }
        self.layer.visible_tiles(&self.viewport)
    }

    /// The main view's extent in inset pixels: (top-left, bottom-right)
    pub fn aiming_rect_pixels(&self) -> (Point, Point) {
        let top_left = self
            .viewport
            .lat_lng_to_container_point(&self.aiming_rect.north_west());
        let bottom_right = self
            .viewport
            .lat_lng_to_container_point(&self.aiming_rect.south_east());
        (top_left, bottom_right)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layer(&self) -> &TileLayer {
        &self.layer
    }

    pub fn aiming_rect(&self) -> &LatLngBounds {
        &self.aiming_rect
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapConfig;
    use crate::core::geo::LatLng;
    use crate::dom::MemoryDocument;

    fn setup() -> (Map, MemoryDocument, MiniMap) {
        let mut doc = MemoryDocument::with_elements(&["#map"]).unwrap();
        let mut map = Map::new(LatLng::new(0.0, 0.0), 1.0, Point::new(800.0, 600.0));
        let container = doc.require("#map").unwrap();
        map.controls_mut().mount(container);

        let config = MapConfig::default();
        let layer = config.minimap.tile_config(&config.tile).build_layer();
        let minimap = MiniMap::new(layer, &config.minimap);
        (map, doc, minimap)
    }

    #[test]
    fn test_zoom_follows_main_map_within_range() {
        let (mut map, mut doc, mut minimap) = setup();
        minimap.mount(&mut map, &mut doc).unwrap();
        assert_eq!(minimap.viewport().zoom, 0.0);

        map.set_view(LatLng::new(-37.889923, -58.265049), 14.0).unwrap();
        minimap.sync(map.viewport());
        assert_eq!(minimap.viewport().zoom, 9.0);
        assert_eq!(minimap.viewport().center, LatLng::new(-37.889923, -58.265049));

        map.set_view(LatLng::new(-37.889923, -58.265049), 18.0).unwrap();
        minimap.sync(map.viewport());
        assert_eq!(minimap.viewport().zoom, 13.0);
    }

    #[test]
    fn test_aiming_rect_matches_main_bounds() {
        let (mut map, mut doc, mut minimap) = setup();
        map.set_view(LatLng::new(10.0, 10.0), 10.0).unwrap();
        minimap.mount(&mut map, &mut doc).unwrap();

        assert_eq!(minimap.aiming_rect(), &map.viewport().bounds());
        let (top_left, bottom_right) = minimap.aiming_rect_pixels();
        // main view is 800x600 at zoom 10, the inset is at zoom 5
        assert!((bottom_right.x - top_left.x - 25.0).abs() < 1e-6);
        assert!((bottom_right.y - top_left.y - 18.75).abs() < 1e-6);
    }

    #[test]
    fn test_toggle_display() {
        let (mut map, mut doc, mut minimap) = setup();
        minimap.mount(&mut map, &mut doc).unwrap();
        assert!(!minimap.visible_tiles().is_empty());

        assert!(minimap.toggle_display(&mut doc).unwrap());
        let element = minimap.element().unwrap();
        assert!(doc.has_class(element, "minimap-minimized"));
        assert!(minimap.visible_tiles().is_empty());

        assert!(!minimap.toggle_display(&mut doc).unwrap());
        assert!(!doc.has_class(element, "minimap-minimized"));
    }

    #[test]
    fn test_toggle_ignored_without_button() {
        let (mut map, mut doc, _) = setup();
        let config = MiniMapConfig {
            toggle_display: false,
            ..Default::default()
        };
        let mut minimap = MiniMap::new(TileLayer::openstreetmap(), &config);
        minimap.mount(&mut map, &mut doc).unwrap();

        assert!(doc.query(".minimap-toggle-display").is_none());
        assert!(!minimap.toggle_display(&mut doc).unwrap());
    }
}
