//! Control corners, the control registry and the stock zoom/attribution controls

use crate::{
    core::map::Map,
    dom::{Document, ElementId},
    prelude::HashMap,
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Corner of the map container a control is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Position {
    /// Classes of the corner container
    pub fn corner_classes(&self) -> &'static str {
        match self {
            Position::TopLeft => "map-control-corner map-top map-left",
            Position::TopRight => "map-control-corner map-top map-right",
            Position::BottomLeft => "map-control-corner map-bottom map-left",
            Position::BottomRight => "map-control-corner map-bottom map-right",
        }
    }
}

/// A control attached to the surface
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEntry {
    pub name: String,
    pub position: Position,
    pub element: ElementId,
}

/// Registry of the controls attached to the map surface, plus the corner
/// containers they live in
#[derive(Debug, Default)]
pub struct ControlManager {
    container: Option<ElementId>,
    corners: HashMap<Position, ElementId>,
    controls: Vec<ControlEntry>,
}

impl ControlManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the registry to the map container element
    pub fn mount(&mut self, container: ElementId) {
        self.container = Some(container);
        self.corners.clear();
    }

    /// Corner container for `position`, created on first use
    pub fn corner(&mut self, doc: &mut dyn Document, position: Position) -> Result<ElementId> {
        if let Some(corner) = self.corners.get(&position) {
            return Ok(*corner);
        }
        let container = self
            .container
            .ok_or_else(|| MapError::Dom("controls used before the map was mounted".to_string()))?;
        let corner = doc.create_child(container, "div", position.corner_classes())?;
        self.corners.insert(position, corner);
        Ok(corner)
    }

    /// Creates the root element of a control in its corner and registers it
    pub fn create_control(
        &mut self,
        doc: &mut dyn Document,
        name: &str,
        position: Position,
        classes: &str,
    ) -> Result<ElementId> {
        if self.contains(name) {
            return Err(MapError::Dom(format!("control '{name}' is already attached")));
        }
        let corner = self.corner(doc, position)?;
        let element = doc.create_child(corner, "div", classes)?;
        doc.add_class(element, "map-control")?;
        self.controls.push(ControlEntry {
            name: name.to_string(),
            position,
            element,
        });
        log::debug!("attached control '{}' at {:?}", name, position);
        Ok(element)
    }

    /// Detaches a control and deletes its element
    pub fn remove_control(&mut self, doc: &mut dyn Document, name: &str) -> Result<bool> {
        let Some(index) = self.controls.iter().position(|c| c.name == name) else {
            return Ok(false);
        };
        let entry = self.controls.remove(index);
        doc.remove_element(entry.element)?;
        Ok(true)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controls.iter().any(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&ControlEntry> {
        self.controls.iter().find(|c| c.name == name)
    }

    pub fn controls(&self) -> &[ControlEntry] {
        &self.controls
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

/// Attribution text of the visible tile layers, bottom-right
#[derive(Debug)]
pub struct Attribution {
    element: ElementId,
}

impl Attribution {
    pub const NAME: &'static str = "attribution";

    pub fn mount(map: &mut Map, doc: &mut dyn Document) -> Result<Self> {
        let element = map.controls_mut().create_control(
            doc,
            Self::NAME,
            Position::BottomRight,
            "map-control-attribution",
        )?;
        let attribution = Self { element };
        attribution.update(map, doc)?;
        Ok(attribution)
    }

    /// Rewrites the text from the current layers
    pub fn update(&self, map: &Map, doc: &mut dyn Document) -> Result<()> {
        doc.set_inner_html(self.element, &map.attributions().join(" | "))
    }

    pub fn element(&self) -> ElementId {
        self.element
    }
}

/// The +/- zoom buttons, top-left
#[derive(Debug)]
pub struct ZoomControl {
    zoom_in: ElementId,
    zoom_out: ElementId,
}

impl ZoomControl {
    pub const NAME: &'static str = "zoom";
    pub const ZOOM_IN_CLASS: &'static str = "map-control-zoom-in";
    pub const ZOOM_OUT_CLASS: &'static str = "map-control-zoom-out";
    const DISABLED_CLASS: &'static str = "map-disabled";

    pub fn mount(map: &mut Map, doc: &mut dyn Document) -> Result<Self> {
        let root = map.controls_mut().create_control(
            doc,
            Self::NAME,
            Position::TopLeft,
            "map-control-zoom map-bar",
        )?;

        let zoom_in = doc.create_child(root, "a", Self::ZOOM_IN_CLASS)?;
        doc.set_attribute(zoom_in, "href", "#")?;
        doc.set_attribute(zoom_in, "title", "Zoom in")?;
        doc.set_text(zoom_in, "+")?;

        let zoom_out = doc.create_child(root, "a", Self::ZOOM_OUT_CLASS)?;
        doc.set_attribute(zoom_out, "href", "#")?;
        doc.set_attribute(zoom_out, "title", "Zoom out")?;
        doc.set_text(zoom_out, "\u{2212}")?;

        let control = Self { zoom_in, zoom_out };
        control.update(map, doc)?;
        Ok(control)
    }

    /// Greys out the button that cannot zoom any further
    pub fn update(&self, map: &Map, doc: &mut dyn Document) -> Result<()> {
        let viewport = map.viewport();
        for (element, disabled) in [
            (self.zoom_in, viewport.zoom >= viewport.max_zoom),
            (self.zoom_out, viewport.zoom <= viewport.min_zoom),
        ] {
            if disabled {
                doc.add_class(element, Self::DISABLED_CLASS)?;
            } else {
                doc.remove_class(element, Self::DISABLED_CLASS)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};
    use crate::dom::MemoryDocument;
    use crate::layers::tile::TileLayer;

    fn mounted() -> (Map, MemoryDocument) {
        let mut doc = MemoryDocument::with_elements(&["#map"]).unwrap();
        let mut map = Map::new(LatLng::new(0.0, 0.0), 2.0, Point::new(400.0, 300.0));
        let container = doc.require("#map").unwrap();
        map.controls_mut().mount(container);
        (map, doc)
    }

    #[test]
    fn test_corners_are_created_once() {
        let (mut map, mut doc) = mounted();
        let a = map.controls_mut().corner(&mut doc, Position::TopLeft).unwrap();
        let b = map.controls_mut().corner(&mut doc, Position::TopLeft).unwrap();
        assert_eq!(a, b);
        assert_eq!(doc.query_all(".map-control-corner").len(), 1);
    }

    #[test]
    fn test_duplicate_control_names_are_rejected() {
        let (mut map, mut doc) = mounted();
        map.controls_mut()
            .create_control(&mut doc, "legend", Position::BottomLeft, "description")
            .unwrap();
        assert!(map
            .controls_mut()
            .create_control(&mut doc, "legend", Position::BottomLeft, "description")
            .is_err());

        assert!(map.controls_mut().remove_control(&mut doc, "legend").unwrap());
        assert!(doc.query(".description").is_none());
        assert!(!map.controls_mut().remove_control(&mut doc, "legend").unwrap());
    }

    #[test]
    fn test_unmounted_controls_fail() {
        let mut doc = MemoryDocument::new();
        let mut map = Map::new(LatLng::new(0.0, 0.0), 2.0, Point::new(400.0, 300.0));
        assert!(map.controls_mut().corner(&mut doc, Position::TopLeft).is_err());
    }

    #[test]
    fn test_attribution_lists_tile_layers() {
        let (mut map, mut doc) = mounted();
        map.add_layer(Box::new(TileLayer::openstreetmap())).unwrap();
        let attribution = Attribution::mount(&mut map, &mut doc).unwrap();

        let html = doc.inner_html(attribution.element()).unwrap();
        assert!(html.contains("OpenStreetMap"));
    }

    #[test]
    fn test_zoom_control_disables_at_limits() {
        let (mut map, mut doc) = mounted();
        let control = ZoomControl::mount(&mut map, &mut doc).unwrap();
        let zoom_in = doc.query(".map-control-zoom-in").unwrap();
        assert!(!doc.has_class(zoom_in, "map-disabled"));

        map.set_view(LatLng::new(0.0, 0.0), 18.0).unwrap();
        control.update(&map, &mut doc).unwrap();
        assert!(doc.has_class(zoom_in, "map-disabled"));
    }
}
