use crate::{
    core::{geo::Point, map::Map},
    layers::{
        base::{LayerId, LayerType},
        marker::{Icon, Marker},
        tile::TileLayer,
        vector::{Circle, PathStyle},
    },
    MapError, Result,
};

/// Commands produced for one frame, in container pixels
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Tile {
        layer_id: LayerId,
        url: String,
        bounds: (Point, Point), // min, max
        opacity: f32,
    },
    Circle {
        layer_id: LayerId,
        center: Point,
        radius: f64,
        style: PathStyle,
        opacity: f32,
    },
    Marker {
        layer_id: LayerId,
        position: Point,
        icon: Icon,
        title: Option<String>,
        opacity: f32,
    },
    Popup {
        layer_id: LayerId,
        anchor: Point,
        text: String,
    },
}

/// Collects the draw commands of a frame
pub struct RenderContext {
    pub width: f64,
    pub height: f64,
    pub drawing_queue: Vec<DrawCommand>,
    /// Commands entirely outside these bounds are dropped
    pub clip_bounds: Option<(Point, Point)>,
}

impl RenderContext {
    pub fn new(size: Point) -> Self {
        Self {
            width: size.x,
            height: size.y,
            drawing_queue: Vec::new(),
            clip_bounds: Some((Point::new(0.0, 0.0), size)),
        }
    }

    /// Builds the frame for the current state of `map`
    pub fn from_map(map: &Map) -> Result<Self> {
        let viewport = map.viewport();
        let mut ctx = Self::new(viewport.size);

        for (id, layer) in map.layers() {
            if !layer.is_visible() {
                continue;
            }
            let opacity = layer.opacity();
            match layer.layer_type() {
                LayerType::Tile => {
                    let Some(tiles) = layer.as_any().downcast_ref::<TileLayer>() else {
                        continue;
                    };
                    for tile in tiles.visible_tiles(viewport) {
                        let max = tile.offset + Point::new(tile.size, tile.size);
                        ctx.render_tile(id, tile.url, (tile.offset, max), opacity)?;
                    }
                }
                LayerType::Circle => {
                    let Some(circle) = layer.as_any().downcast_ref::<Circle>() else {
                        continue;
                    };
                    let center = viewport.lat_lng_to_container_point(&circle.center());
                    let radius = circle.radius() / viewport.meters_per_pixel(circle.center().lat);
                    ctx.render_circle(id, center, radius, circle.style(), opacity)?;
                }
                LayerType::Marker => {
                    let Some(marker) = layer.as_any().downcast_ref::<Marker>() else {
                        continue;
                    };
                    let position = viewport.lat_lng_to_container_point(&marker.position());
                    ctx.render_marker(id, position, marker, opacity);
                }
                LayerType::Custom => {
                    log::trace!("layer {} has no renderer", id);
                }
            }
        }

        if let Some(id) = map.open_popup_id() {
            if let Some(marker) = map.layer_as::<Marker>(id) {
                if let Some(text) = marker.popup() {
                    let (dx, dy) = marker.icon().popup_anchor();
                    let anchor = viewport.lat_lng_to_container_point(&marker.position())
                        + Point::new(dx as f64, dy as f64);
                    ctx.drawing_queue.push(DrawCommand::Popup {
                        layer_id: id,
                        anchor,
                        text: text.to_string(),
                    });
                }
            }
        }

        Ok(ctx)
    }

    pub fn begin_frame(&mut self) {
        self.drawing_queue.clear();
    }

    /// Queues a tile; off-screen tiles are skipped
    pub fn render_tile(
        &mut self,
        layer_id: LayerId,
        url: String,
        bounds: (Point, Point),
        opacity: f32,
    ) -> Result<()> {
        if bounds.0.x >= bounds.1.x || bounds.0.y >= bounds.1.y {
            return Err(MapError::Layer("invalid tile bounds".to_string()));
        }
        if !(0.0..=1.0).contains(&opacity) {
            return Err(MapError::Layer("opacity must be between 0.0 and 1.0".to_string()));
        }
        if self.is_clipped(bounds) {
            return Ok(());
        }
        self.drawing_queue.push(DrawCommand::Tile {
            layer_id,
            url,
            bounds,
            opacity,
        });
        Ok(())
    }

    pub fn render_circle(
        &mut self,
        layer_id: LayerId,
        center: Point,
        radius: f64,
        style: &PathStyle,
        opacity: f32,
    ) -> Result<()> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(MapError::Layer(format!("invalid circle radius {radius}")));
        }
        let extent = Point::new(radius, radius);
        if self.is_clipped((center - extent, center + extent)) {
            return Ok(());
        }
        self.drawing_queue.push(DrawCommand::Circle {
            layer_id,
            center,
            radius,
            style: style.clone(),
            opacity,
        });
        Ok(())
    }

    /// Markers are never clipped so their popups stay reachable
    pub fn render_marker(&mut self, layer_id: LayerId, position: Point, marker: &Marker, opacity: f32) {
        self.drawing_queue.push(DrawCommand::Marker {
            layer_id,
            position,
            icon: marker.icon().clone(),
            title: marker.title().map(str::to_string),
            opacity,
        });
    }

    pub fn drawing_queue(&self) -> &[DrawCommand] {
        &self.drawing_queue
    }

    fn is_clipped(&self, (min, max): (Point, Point)) -> bool {
        match self.clip_bounds {
            Some((clip_min, clip_max)) => {
                max.x < clip_min.x || min.x > clip_max.x || max.y < clip_min.y || min.y > clip_max.y
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    #[test]
    fn test_frame_contains_tiles_then_overlays() {
        let mut map = Map::new(LatLng::new(0.0, 0.0), 1.0, Point::new(800.0, 600.0));
        map.add_layer(Box::new(TileLayer::openstreetmap())).unwrap();
        map.add_layer(Box::new(Circle::new(LatLng::new(0.0, 0.0), 100_000.0)))
            .unwrap();
        let marker_id = map
            .add_layer(Box::new(Marker::new(LatLng::new(0.0, 0.0)).with_popup("hi")))
            .unwrap();
        map.open_popup(marker_id).unwrap();

        let ctx = RenderContext::from_map(&map).unwrap();
        let queue = ctx.drawing_queue();
        let tiles = queue
            .iter()
            .filter(|c| matches!(c, DrawCommand::Tile { .. }))
            .count();
        // zoom 1 is a 512px world, repeated horizontally across the 800px container
        assert_eq!(tiles, 8);
        assert!(matches!(queue[tiles], DrawCommand::Circle { .. }));
        assert!(matches!(queue[tiles + 1], DrawCommand::Marker { .. }));
        match queue.last() {
            Some(DrawCommand::Popup { text, anchor, .. }) => {
                assert_eq!(text, "hi");
                assert_eq!(*anchor, Point::new(401.0, 266.0));
            }
            other => panic!("expected popup, got {other:?}"),
        }
    }

    #[test]
    fn test_offscreen_circles_are_skipped() {
        let mut map = Map::new(LatLng::new(0.0, 0.0), 10.0, Point::new(400.0, 300.0));
        map.add_layer(Box::new(Circle::new(LatLng::new(60.0, 60.0), 10.0)))
            .unwrap();
        let ctx = RenderContext::from_map(&map).unwrap();
        assert!(ctx.drawing_queue().is_empty());
    }

    #[test]
    fn test_invalid_tile_bounds() {
        let mut ctx = RenderContext::new(Point::new(100.0, 100.0));
        let bad = (Point::new(10.0, 10.0), Point::new(5.0, 20.0));
        assert!(ctx.render_tile(LayerId(1), "x".into(), bad, 1.0).is_err());
        ctx.begin_frame();
        assert!(ctx.drawing_queue().is_empty());
    }
}
