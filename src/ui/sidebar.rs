//! Sidebar list of points of interest, each linked to a marker on the map

use crate::{
    core::{geo::LatLng, map::Map},
    dom::{selectors::MARKER_LINK_CLASS, Document, ElementId},
    layers::{base::LayerId, marker::Marker},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// A named place with the zoom level it is best viewed at.
///
/// Deserializes from `{ "lat", "lng", "title", "zoom" }` or `[lat, lng, title, zoom]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PointRepr")]
pub struct PointOfInterest {
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub zoom: u8,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointRepr {
    Tuple(f64, f64, String, u8),
    Object {
        lat: f64,
        lng: f64,
        title: String,
        zoom: u8,
    },
}

impl From<PointRepr> for PointOfInterest {
    fn from(repr: PointRepr) -> Self {
        match repr {
            PointRepr::Tuple(lat, lng, title, zoom) | PointRepr::Object { lat, lng, title, zoom } => {
                Self { lat, lng, title, zoom }
            }
        }
    }
}

impl PointOfInterest {
    pub fn new(lat: f64, lng: f64, title: impl Into<String>, zoom: u8) -> Self {
        Self {
            lat,
            lng,
            title: title.into(),
            zoom,
        }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

/// One mounted sidebar row
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarEntry {
    pub point: PointOfInterest,
    pub marker_id: LayerId,
    pub link: ElementId,
}

/// Links in the page's routes container, one per point, plus the markers they
/// jump to
#[derive(Debug, Default)]
pub struct PoiSidebar {
    entries: Vec<SidebarEntry>,
}

impl PoiSidebar {
    /// Adds a marker per point to the map and a link per point to `container_selector`
    pub fn mount(
        map: &mut Map,
        doc: &mut dyn Document,
        container_selector: &str,
        points: &[PointOfInterest],
    ) -> Result<Self> {
        let container = doc.require(container_selector)?;
        let mut entries = Vec::with_capacity(points.len());

        for point in points {
            let marker = Marker::new(point.lat_lng())
                .with_title(point.title.clone())
                .with_popup(point.title.clone());
            let marker_id = map.add_layer(Box::new(marker))?;

            let link = doc.create_child(container, "a", MARKER_LINK_CLASS)?;
            doc.set_attribute(link, "id", &marker_id.to_string())?;
            doc.set_attribute(link, "href", "#")?;
            doc.set_text(link, &point.title)?;

            entries.push(SidebarEntry {
                point: point.clone(),
                marker_id,
                link,
            });
        }

        log::debug!("sidebar mounted with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[SidebarEntry] {
        &self.entries
    }

    pub fn entry(&self, marker_id: LayerId) -> Option<&SidebarEntry> {
        self.entries.iter().find(|e| e.marker_id == marker_id)
    }

    pub fn entry_by_title(&self, title: &str) -> Option<&SidebarEntry> {
        self.entries.iter().find(|e| e.point.title == title)
    }

    /// Jumps the map to the point behind the clicked link
    pub fn on_link_click(&self, map: &mut Map, marker_id: LayerId) -> Result<()> {
        let entry = self
            .entry(marker_id)
            .ok_or_else(|| MapError::UnknownEntry(marker_id.to_string()))?;

        log::debug!("sidebar: jumping to {}", entry.point.title);
        map.set_view(entry.point.lat_lng(), entry.point.zoom as f64)
    }

    /// Per-marker hook; markers have no behaviour of their own beyond their popup
    pub fn on_marker_click(&self, marker_id: LayerId) {
        if let Some(entry) = self.entry(marker_id) {
            log::trace!("marker clicked: {}", entry.point.title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::Point;
    use crate::dom::MemoryDocument;

    fn setup() -> (Map, MemoryDocument) {
        let doc = MemoryDocument::with_elements(&["nav.routes"]).unwrap();
        let map = Map::new(LatLng::new(0.0, 0.0), 1.0, Point::new(800.0, 600.0));
        (map, doc)
    }

    fn points() -> Vec<PointOfInterest> {
        vec![
            PointOfInterest::new(-37.889923, -58.265049, "La Barrosa", 14),
            PointOfInterest::new(-38.0055, -57.5426, "Mar del Plata", 12),
        ]
    }

    #[test]
    fn test_links_mirror_markers() {
        let (mut map, mut doc) = setup();
        let sidebar = PoiSidebar::mount(&mut map, &mut doc, ".routes", &points()).unwrap();

        assert_eq!(sidebar.entries().len(), 2);
        for entry in sidebar.entries() {
            assert!(map.has_layer(entry.marker_id));
            assert_eq!(doc.text(entry.link).unwrap(), entry.point.title);
            assert_eq!(
                doc.attribute(entry.link, "id").unwrap(),
                entry.marker_id.to_string()
            );
            assert_eq!(doc.attribute(entry.link, "href").as_deref(), Some("#"));
        }
        assert_eq!(doc.query_all("a.marker-click").len(), 2);
    }

    #[test]
    fn test_link_click_sets_view() {
        let (mut map, mut doc) = setup();
        let sidebar = PoiSidebar::mount(&mut map, &mut doc, ".routes", &points()).unwrap();
        let entry = sidebar.entry_by_title("Mar del Plata").unwrap().clone();

        sidebar.on_link_click(&mut map, entry.marker_id).unwrap();
        assert_eq!(map.viewport().center, LatLng::new(-38.0055, -57.5426));
        assert_eq!(map.viewport().zoom, 12.0);
    }

    #[test]
    fn test_unknown_link_is_an_error() {
        let (mut map, mut doc) = setup();
        let sidebar = PoiSidebar::mount(&mut map, &mut doc, ".routes", &points()).unwrap();
        assert!(matches!(
            sidebar.on_link_click(&mut map, LayerId(999)),
            Err(MapError::UnknownEntry(_))
        ));
    }

    #[test]
    fn test_missing_container_is_fatal() {
        let mut doc = MemoryDocument::new();
        let mut map = Map::new(LatLng::new(0.0, 0.0), 1.0, Point::new(800.0, 600.0));
        let result = PoiSidebar::mount(&mut map, &mut doc, ".routes", &points());
        assert!(matches!(result, Err(MapError::MissingElement { .. })));
    }

    #[test]
    fn test_marker_click_changes_nothing() {
        let (mut map, mut doc) = setup();
        let sidebar = PoiSidebar::mount(&mut map, &mut doc, ".routes", &points()).unwrap();
        let before = map.viewport().clone();

        sidebar.on_marker_click(sidebar.entries()[0].marker_id);
        assert_eq!(map.viewport(), &before);
    }
}
