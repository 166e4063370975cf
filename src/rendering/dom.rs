//! Writes frames into a [`Document`]. Each surface has a tile pane, whose
//! images survive across frames while their tile stays in view, and an
//! overlay pane that is redrawn from scratch every frame.

use crate::{
    core::{geo::Point, map::Map},
    dom::{Document, ElementId},
    prelude::HashMap,
    rendering::context::{DrawCommand, RenderContext},
    ui::minimap::MiniMap,
    MapError, Result,
};

/// Attribute carrying the surface id of a drawn layer
pub const LAYER_ID_ATTRIBUTE: &str = "data-layer-id";

fn not_mounted() -> MapError {
    MapError::Dom("renderer used before it was mounted".to_string())
}

/// Element ids drawn into one pane during the previous frame
#[derive(Debug, Default)]
struct Pane {
    element: Option<ElementId>,
    drawn: Vec<ElementId>,
}

impl Pane {
    fn clear(&mut self, doc: &mut dyn Document) -> Result<()> {
        for id in self.drawn.drain(..) {
            doc.remove_element(id)?;
        }
        Ok(())
    }

    fn draw(&mut self, doc: &mut dyn Document, tag: &str, classes: &str) -> Result<ElementId> {
        let element = doc.create_child(self.element.ok_or_else(not_mounted)?, tag, classes)?;
        self.drawn.push(element);
        Ok(element)
    }
}

struct TileImage<'a> {
    url: &'a str,
    top_left: Point,
    size: Point,
    opacity: f32,
}

/// Tile `<img>`s keyed by URL and by how often that URL already appeared in
/// the frame, since the horizontally wrapped world repeats tiles
#[derive(Debug, Default)]
struct TilePane {
    element: Option<ElementId>,
    images: HashMap<(String, usize), ElementId>,
}

impl TilePane {
    /// Moves the images still in view, creates the missing ones and removes
    /// the rest; returns how many are shown
    fn sync<'a>(
        &mut self,
        doc: &mut dyn Document,
        tiles: impl IntoIterator<Item = TileImage<'a>>,
    ) -> Result<usize> {
        let parent = self.element.ok_or_else(not_mounted)?;
        let mut stale = std::mem::take(&mut self.images);
        let mut repeats: HashMap<&str, usize> = HashMap::default();
        let mut created = 0;

        for tile in tiles {
            let seen = repeats.entry(tile.url).or_insert(0);
            let key = (tile.url.to_string(), *seen);
            *seen += 1;

            let img = match stale.remove(&key) {
                Some(img) => img,
                None => {
                    let img = doc.create_child(parent, "img", "map-tile")?;
                    doc.set_attribute(img, "src", tile.url)?;
                    created += 1;
                    img
                }
            };
            doc.set_attribute(img, "style", &box_style(tile.top_left, tile.size, tile.opacity))?;
            self.images.insert(key, img);
        }

        for (_, img) in stale {
            doc.remove_element(img)?;
        }
        log::trace!("{} tiles shown, {} new", self.images.len(), created);
        Ok(self.images.len())
    }

    fn clear(&mut self, doc: &mut dyn Document) -> Result<()> {
        for (_, img) in self.images.drain() {
            doc.remove_element(img)?;
        }
        Ok(())
    }
}

/// A pane element holding a tile pane below an overlay pane
#[derive(Debug, Default)]
struct Surface {
    tiles: TilePane,
    overlays: Pane,
}

impl Surface {
    fn mount(doc: &mut dyn Document, parent: ElementId, classes: &str) -> Result<Self> {
        let pane = doc.create_child(parent, "div", classes)?;
        let tiles = doc.create_child(pane, "div", "map-tile-pane")?;
        let overlays = doc.create_child(pane, "div", "map-overlay-pane")?;
        Ok(Self {
            tiles: TilePane {
                element: Some(tiles),
                images: HashMap::default(),
            },
            overlays: Pane {
                element: Some(overlays),
                drawn: Vec::new(),
            },
        })
    }

    fn is_mounted(&self) -> bool {
        self.overlays.element.is_some()
    }
}

#[derive(Debug, Default)]
pub struct DomRenderer {
    map: Surface,
    minimap: Surface,
    frames: u64,
}

impl DomRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the map pane as the first child of `container`
    pub fn mount(&mut self, doc: &mut dyn Document, container: ElementId) -> Result<()> {
        self.map = Surface::mount(doc, container, "map-pane")?;
        Ok(())
    }

    /// Creates the pane holding the mini-map tiles and the aiming rectangle
    pub fn mount_minimap(&mut self, doc: &mut dyn Document, minimap: &MiniMap) -> Result<()> {
        let element = minimap
            .element()
            .ok_or_else(|| MapError::Dom("mini-map is not mounted".to_string()))?;
        self.minimap = Surface::mount(doc, element, "minimap-pane")?;
        Ok(())
    }

    /// Brings the page in line with the current map state; returns the
    /// number of elements shown
    pub fn render(&mut self, doc: &mut dyn Document, map: &Map) -> Result<usize> {
        let ctx = RenderContext::from_map(map)?;
        self.map.overlays.clear(doc)?;

        let mut tiles = Vec::new();
        for command in ctx.drawing_queue() {
            match command {
                DrawCommand::Tile {
                    url,
                    bounds: (min, max),
                    opacity,
                    ..
                } => tiles.push(TileImage {
                    url,
                    top_left: *min,
                    size: *max - *min,
                    opacity: *opacity,
                }),
                overlay => self.draw_overlay(doc, overlay)?,
            }
        }
        let shown = self.map.tiles.sync(doc, tiles)? + self.map.overlays.drawn.len();

        self.frames += 1;
        log::trace!("frame {}: {} elements", self.frames, shown);
        Ok(shown)
    }

    pub fn render_minimap(&mut self, doc: &mut dyn Document, minimap: &MiniMap) -> Result<()> {
        if !self.minimap.is_mounted() {
            return Ok(());
        }
        self.minimap.overlays.clear(doc)?;
        if minimap.is_minimized() {
            return self.minimap.tiles.clear(doc);
        }

        let visible = minimap.visible_tiles();
        self.minimap.tiles.sync(
            doc,
            visible.iter().map(|tile| TileImage {
                url: &tile.url,
                top_left: tile.offset,
                size: Point::new(tile.size, tile.size),
                opacity: 1.0,
            }),
        )?;

        let (top_left, bottom_right) = minimap.aiming_rect_pixels();
        let rect = self.minimap.overlays.draw(doc, "div", "minimap-aiming-rect")?;
        doc.set_attribute(rect, "style", &box_style(top_left, bottom_right - top_left, 1.0))?;
        Ok(())
    }

    fn draw_overlay(&mut self, doc: &mut dyn Document, command: &DrawCommand) -> Result<()> {
        match command {
            DrawCommand::Tile { .. } => {
                return Err(MapError::Dom("tiles belong in the tile pane".to_string()));
            }
            DrawCommand::Circle {
                layer_id,
                center,
                radius,
                style,
                opacity,
            } => {
                let mut classes = String::from("map-circle");
                if let Some(class_name) = &style.class_name {
                    classes.push(' ');
                    classes.push_str(class_name);
                }
                let el = self.map.overlays.draw(doc, "div", &classes)?;
                doc.set_attribute(el, LAYER_ID_ATTRIBUTE, &layer_id.to_string())?;

                let extent = Point::new(*radius, *radius);
                let mut css = box_style(*center - extent, extent * 2.0, *opacity);
                css.push_str(" border-radius: 50%;");
                if style.fill {
                    css.push_str(&format!(
                        " background: {}; --fill-opacity: {};",
                        style.fill_color, style.fill_opacity
                    ));
                }
                if style.stroke {
                    css.push_str(&format!(" border: {}px solid {};", style.weight, style.color));
                }
                doc.set_attribute(el, "style", &css)?;
            }
            DrawCommand::Marker {
                layer_id,
                position,
                icon,
                title,
                opacity,
            } => {
                let classes = format!("map-marker {}", icon.class_name());
                let el = self.map.overlays.draw(doc, "div", &classes)?;
                doc.set_attribute(el, LAYER_ID_ATTRIBUTE, &layer_id.to_string())?;
                if let Some(title) = title {
                    doc.set_attribute(el, "title", title)?;
                }
                let (w, h) = icon.size();
                let (ax, ay) = icon.anchor();
                let top_left = *position - Point::new(ax as f64, ay as f64);
                doc.set_attribute(
                    el,
                    "style",
                    &box_style(top_left, Point::new(w as f64, h as f64), *opacity),
                )?;
            }
            DrawCommand::Popup {
                layer_id,
                anchor,
                text,
            } => {
                let el = self.map.overlays.draw(doc, "div", "map-popup")?;
                doc.set_attribute(el, LAYER_ID_ATTRIBUTE, &layer_id.to_string())?;
                doc.set_attribute(
                    el,
                    "style",
                    &format!("left: {:.1}px; top: {:.1}px;", anchor.x, anchor.y),
                )?;
                doc.set_text(el, text)?;
            }
        }
        Ok(())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn box_style(top_left: Point, size: Point, opacity: f32) -> String {
    format!(
        "left: {:.1}px; top: {:.1}px; width: {:.1}px; height: {:.1}px; opacity: {};",
        top_left.x, top_left.y, size.x, size.y, opacity
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MapConfig;
    use crate::core::geo::LatLng;
    use crate::dom::MemoryDocument;
    use crate::layers::{marker::Marker, tile::TileLayer};

    fn setup() -> (Map, MemoryDocument, DomRenderer) {
        let mut doc = MemoryDocument::with_elements(&["#map"]).unwrap();
        let container = doc.require("#map").unwrap();
        let mut map = Map::new(LatLng::new(0.0, 0.0), 1.0, Point::new(800.0, 600.0));
        map.controls_mut().mount(container);
        let mut renderer = DomRenderer::new();
        renderer.mount(&mut doc, container).unwrap();
        (map, doc, renderer)
    }

    #[test]
    fn test_rerender_replaces_previous_frame() {
        let (mut map, mut doc, mut renderer) = setup();
        map.add_layer(Box::new(TileLayer::openstreetmap())).unwrap();

        assert_eq!(renderer.render(&mut doc, &map).unwrap(), 8);
        assert_eq!(renderer.render(&mut doc, &map).unwrap(), 8);
        assert_eq!(doc.query_all("img.map-tile").len(), 8);
        assert_eq!(renderer.frames(), 2);
    }

    #[test]
    fn test_tiles_in_view_keep_their_images() {
        let (mut map, mut doc, mut renderer) = setup();
        map.add_layer(Box::new(TileLayer::openstreetmap())).unwrap();
        map.set_view(LatLng::new(-37.889923, -58.265049), 14.0).unwrap();
        renderer.render(&mut doc, &map).unwrap();
        let before = doc.query_all("img.map-tile");

        map.pan_by(Point::new(40.0, 0.0));
        renderer.render(&mut doc, &map).unwrap();
        let after = doc.query_all("img.map-tile");

        let kept = after.iter().filter(|img| before.contains(img)).count();
        assert!(kept >= before.len() - 4, "only {kept} of {} images kept", before.len());
        assert!(doc.query(".map-tile-pane").is_some());
        assert!(doc.query(".map-overlay-pane").is_some());
    }

    #[test]
    fn test_marker_carries_layer_id() {
        let (mut map, mut doc, mut renderer) = setup();
        let id = map
            .add_layer(Box::new(Marker::new(LatLng::new(0.0, 0.0)).with_title("La Barrosa")))
            .unwrap();
        renderer.render(&mut doc, &map).unwrap();

        let el = doc.require(".map-marker").unwrap();
        assert_eq!(doc.attribute(el, LAYER_ID_ATTRIBUTE), Some(id.to_string()));
        assert_eq!(doc.attribute(el, "title").as_deref(), Some("La Barrosa"));

        map.remove_layer(id);
        renderer.render(&mut doc, &map).unwrap();
        assert!(doc.query(".map-marker").is_none());
    }

    #[test]
    fn test_minimap_pane_is_empty_while_minimized() {
        let (mut map, mut doc, mut renderer) = setup();
        let config = MapConfig::default();
        let mut minimap = MiniMap::new(
            config.minimap.tile_config(&config.tile).build_layer(),
            &config.minimap,
        );
        minimap.mount(&mut map, &mut doc).unwrap();
        renderer.mount_minimap(&mut doc, &minimap).unwrap();

        renderer.render_minimap(&mut doc, &minimap).unwrap();
        assert!(doc.query(".minimap-aiming-rect").is_some());
        assert!(doc.query("img.map-tile").is_some());

        minimap.toggle_display(&mut doc).unwrap();
        renderer.render_minimap(&mut doc, &minimap).unwrap();
        assert!(doc.query(".minimap-aiming-rect").is_none());
        assert!(doc.query("img.map-tile").is_none());
    }
}
