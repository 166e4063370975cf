use crate::{
    core::{
        constants::DEFAULT_ZOOM_DELTA,
        geo::{LatLng, Point},
        viewport::Viewport,
    },
    geolocation::{GeolocationService, LocateOptions, LocationError, LocationFix, WatchId},
    input::{EventManager, MapEvent},
    layers::{base::LayerTrait, manager::LayerManager, tile::TileLayer},
    ui::controls::ControlManager,
    MapError, Result,
};

pub use crate::layers::base::LayerId;

#[derive(Debug, Clone)]
pub struct MapOptions {
    pub zoom_control: bool,
    pub attribution_control: bool,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub zoom_delta: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            zoom_control: true,
            attribution_control: true,
            min_zoom: None,
            max_zoom: None,
            zoom_delta: DEFAULT_ZOOM_DELTA,
        }
    }
}

/// A running location watch
#[derive(Debug, Clone)]
struct ActiveLocate {
    watch: WatchId,
    options: LocateOptions,
}

/// The map surface: viewport, layers, controls and the location watch.
///
/// There is one per page. Components receive it as an explicit `&mut Map`.
pub struct Map {
    viewport: Viewport,
    layer_manager: LayerManager,
    controls: ControlManager,
    event_manager: EventManager,
    options: MapOptions,
    next_layer_id: u64,
    locating: Option<ActiveLocate>,
    /// Single-shot watch that delivered its result but is not cleared yet
    spent_watch: Option<WatchId>,
    open_popup: Option<LayerId>,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let viewport = Viewport::new(center, zoom, size);
        Self::with_options(viewport, MapOptions::default())
    }

    pub fn with_options(viewport: Viewport, options: MapOptions) -> Self {
        let mut map = Self {
            viewport,
            layer_manager: LayerManager::new(),
            controls: ControlManager::new(),
            event_manager: EventManager::new(),
            options,
            next_layer_id: 1,
            locating: None,
            spent_watch: None,
            open_popup: None,
        };

        if let (Some(min), Some(max)) = (map.options.min_zoom, map.options.max_zoom) {
            map.viewport.set_zoom_limits(min, max);
        }

        map
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn controls(&self) -> &ControlManager {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ControlManager {
        &mut self.controls
    }

    /// Attaches a layer and returns the id stamped on it
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<LayerId> {
        // only the anchor has to be on the globe; a circle's extent may
        // cross the antimeridian or a pole
        if let Some(bounds) = layer.bounds() {
            let anchor = bounds.center();
            if !anchor.is_valid() {
                return Err(MapError::InvalidCoordinates(format!(
                    "{} anchored outside the world at {:?}",
                    layer.layer_type(),
                    anchor
                )));
            }
        }

        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        log::trace!("adding {} layer {}: {}", layer.layer_type(), id, layer.options());

        self.layer_manager.add_layer(id, layer);
        self.event_manager.emit(MapEvent::LayerAdd { layer_id: id });
        Ok(id)
    }

    /// Detaches a layer; closing its popup if it was open
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Box<dyn LayerTrait>> {
        let removed = self.layer_manager.remove_layer(id)?;
        if self.open_popup == Some(id) {
            self.close_popup();
        }
        self.event_manager.emit(MapEvent::LayerRemove { layer_id: id });
        Some(removed)
    }

    pub fn has_layer(&self, id: LayerId) -> bool {
        self.layer_manager.contains(id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&dyn LayerTrait> {
        self.layer_manager.get_layer(id)
    }

    /// Typed access to a layer
    pub fn layer_as<T: 'static>(&self, id: LayerId) -> Option<&T> {
        self.layer(id)?.as_any().downcast_ref::<T>()
    }

    /// Layers in render order
    pub fn layers(&self) -> Vec<(LayerId, &dyn LayerTrait)> {
        self.layer_manager.layers()
    }

    pub fn layer_count(&self) -> usize {
        self.layer_manager.len()
    }

    /// Number of layers tagged with `class_name` (a full scan)
    pub fn count_layers_with_class(&self, class_name: &str) -> usize {
        self.layers()
            .iter()
            .filter(|(_, layer)| layer.class_name() == Some(class_name))
            .count()
    }

    /// Attribution strings of the visible tile layers, without duplicates
    pub fn attributions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for (_, layer) in self.layers() {
            if !layer.is_visible() {
                continue;
            }
            let attribution = layer
                .as_any()
                .downcast_ref::<TileLayer>()
                .and_then(|tile| tile.attribution());
            if let Some(text) = attribution {
                if !out.iter().any(|existing| existing == text) {
                    out.push(text.to_string());
                }
            }
        }
        out
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        if !center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!("{center}")));
        }
        self.update_view(|viewport| viewport.set_view(center, zoom));
        Ok(())
    }

    /// Fits the whole world into the container
    pub fn fit_world(&mut self) {
        self.update_view(Viewport::fit_world);
    }

    pub fn pan_by(&mut self, offset: Point) {
        self.update_view(|viewport| viewport.pan_by(offset));
    }

    pub fn zoom_in(&mut self) {
        let zoom = self.viewport.zoom + self.options.zoom_delta;
        self.update_view(|viewport| viewport.set_zoom(zoom));
    }

    pub fn zoom_out(&mut self) {
        let zoom = self.viewport.zoom - self.options.zoom_delta;
        self.update_view(|viewport| viewport.set_zoom(zoom));
    }

    pub fn set_size(&mut self, size: Point) {
        self.viewport.set_size(size);
    }

    fn update_view<F: FnOnce(&mut Viewport)>(&mut self, f: F) {
        let old_center = self.viewport.center;
        let old_zoom = self.viewport.zoom;

        f(&mut self.viewport);

        if self.viewport.center != old_center || self.viewport.zoom != old_zoom {
            self.event_manager.emit(MapEvent::ViewChanged {
                center: self.viewport.center,
                zoom: self.viewport.zoom,
            });
        }
    }

    /// A direct click on the surface at container pixel `pixel`
    pub fn click_at(&mut self, pixel: Point) -> LatLng {
        let lat_lng = self.viewport.container_point_to_lat_lng(&pixel);
        self.event_manager.emit(MapEvent::Click { lat_lng, pixel });
        lat_lng
    }

    /// Starts watching the position, replacing any running watch
    pub fn locate(
        &mut self,
        service: &mut dyn GeolocationService,
        options: LocateOptions,
    ) -> std::result::Result<(), LocationError> {
        self.stop_locate(service);

        match service.watch_position(&options) {
            Ok(watch) => {
                log::debug!("location watch {:?} started", watch);
                self.locating = Some(ActiveLocate { watch, options });
                Ok(())
            }
            Err(error) => {
                log::warn!("could not start locating: {}", error);
                Err(error)
            }
        }
    }

    pub fn stop_locate(&mut self, service: &mut dyn GeolocationService) {
        self.release_spent_watch(service);
        if let Some(active) = self.locating.take() {
            service.clear_watch(active.watch);
            log::debug!("location watch {:?} stopped", active.watch);
        }
    }

    pub fn is_locating(&self) -> bool {
        self.locating.is_some()
    }

    /// Clears the platform watch of a finished single-shot locate
    pub fn release_spent_watch(&mut self, service: &mut dyn GeolocationService) {
        if let Some(watch) = self.spent_watch.take() {
            service.clear_watch(watch);
            log::debug!("single-shot watch {:?} released", watch);
        }
    }

    fn finish_single_shot(&mut self) {
        if let Some(active) = self.locating.take() {
            self.spent_watch = Some(active.watch);
        }
    }

    /// Applies a fix from the platform; fixes arriving after `stop_locate`
    /// are dropped and `false` is returned
    pub fn handle_location_found(&mut self, fix: LocationFix) -> bool {
        let Some(options) = self.locating.as_ref().map(|a| a.options.clone()) else {
            log::trace!("dropping stale location fix");
            return false;
        };

        if options.set_view {
            let bounds = fix.lat_lng.to_bounds(fix.accuracy * 2.0);
            let mut zoom = self.viewport.bounds_zoom(&bounds);
            if let Some(max_zoom) = options.max_zoom {
                zoom = zoom.min(max_zoom);
            }
            self.update_view(|viewport| viewport.set_view(fix.lat_lng, zoom));
        }

        if !options.watch {
            self.finish_single_shot();
        }

        self.event_manager.emit(MapEvent::LocationFound(fix));
        true
    }

    /// Applies a location failure; dropped when not locating
    pub fn handle_location_error(&mut self, error: LocationError) -> bool {
        let Some(watch) = self.locating.as_ref().map(|a| a.options.watch) else {
            log::trace!("dropping stale location error");
            return false;
        };
        if !watch {
            self.finish_single_shot();
        }
        log::warn!("location error: {}", error);
        self.event_manager.emit(MapEvent::LocationError(error));
        true
    }

    /// Opens the popup bound to a marker; `false` if the layer has none
    pub fn open_popup(&mut self, id: LayerId) -> Result<bool> {
        let has_popup = self
            .layer_as::<crate::layers::marker::Marker>(id)
            .ok_or_else(|| MapError::Layer(format!("no marker with id {id}")))?
            .popup()
            .is_some();
        if !has_popup {
            return Ok(false);
        }
        self.close_popup();
        self.open_popup = Some(id);
        self.event_manager.emit(MapEvent::PopupOpen { layer_id: id });
        Ok(true)
    }

    pub fn close_popup(&mut self) {
        if let Some(id) = self.open_popup.take() {
            self.event_manager.emit(MapEvent::PopupClose { layer_id: id });
        }
    }

    pub fn open_popup_id(&self) -> Option<LayerId> {
        self.open_popup
    }

    /// Drains the events raised since the last call
    pub fn take_events(&mut self) -> Vec<MapEvent> {
        self.event_manager.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::{LocationErrorCode, ManualGeolocation};
    use crate::layers::{marker::Marker, vector::Circle};

    fn map() -> Map {
        Map::new(LatLng::new(0.0, 0.0), 2.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_layer_ids_are_never_reused() {
        let mut map = map();
        let a = map.add_layer(Box::new(Marker::new(LatLng::new(1.0, 1.0)))).unwrap();
        map.remove_layer(a);
        let b = map.add_layer(Box::new(Marker::new(LatLng::new(1.0, 1.0)))).unwrap();

        assert!(b > a);
        assert!(!map.has_layer(a));
        assert!(map.has_layer(b));
    }

    #[test]
    fn test_invalid_marker_rejected() {
        let mut map = map();
        let result = map.add_layer(Box::new(Marker::new(LatLng::new(120.0, 0.0))));
        assert!(matches!(result, Err(MapError::InvalidCoordinates(_))));
        assert_eq!(map.layer_count(), 0);
    }

    #[test]
    fn test_circle_extent_may_leave_the_globe() {
        let mut map = map();
        let dateline = Circle::new(LatLng::new(-16.8, -179.99), 2500.0);
        let pole = Circle::new(LatLng::new(89.9999, 0.0), 25.0);

        assert!(map.add_layer(Box::new(dateline)).is_ok());
        assert!(map.add_layer(Box::new(pole)).is_ok());
        let off_world = Circle::new(LatLng::new(0.0, 190.0), 10.0);
        assert!(map.add_layer(Box::new(off_world)).is_err());
        assert_eq!(map.layer_count(), 2);
    }

    #[test]
    fn test_set_view_emits_once() {
        let mut map = map();
        map.set_view(LatLng::new(10.0, 10.0), 5.0).unwrap();
        map.set_view(LatLng::new(10.0, 10.0), 5.0).unwrap();

        let events = map.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], MapEvent::ViewChanged { zoom, .. } if zoom == 5.0));
    }

    #[test]
    fn test_click_at_center() {
        let mut map = map();
        map.set_view(LatLng::new(-37.889923, -58.265049), 14.0).unwrap();
        let clicked = map.click_at(Point::new(400.0, 300.0));

        assert!((clicked.lat + 37.889923).abs() < 1e-9);
        assert!((clicked.lng + 58.265049).abs() < 1e-9);
        assert!(map
            .take_events()
            .iter()
            .any(|e| matches!(e, MapEvent::Click { .. })));
    }

    #[test]
    fn test_locate_recenters_on_fix() {
        let mut map = map();
        let mut geo = ManualGeolocation::new();
        map.locate(&mut geo, LocateOptions::default()).unwrap();
        assert!(map.is_locating());

        assert!(map.handle_location_found(LocationFix::new(48.8566, 2.3522, 50.0)));
        assert_eq!(map.viewport().center, LatLng::new(48.8566, 2.3522));
        assert!(map.viewport().zoom > 10.0);
    }

    #[test]
    fn test_locate_respects_max_zoom() {
        let mut map = map();
        let mut geo = ManualGeolocation::new();
        let options = LocateOptions {
            max_zoom: Some(7.0),
            ..Default::default()
        };
        map.locate(&mut geo, options).unwrap();
        map.handle_location_found(LocationFix::new(10.0, 10.0, 5.0));
        assert_eq!(map.viewport().zoom, 7.0);
    }

    #[test]
    fn test_stale_location_events_are_dropped() {
        let mut map = map();
        let mut geo = ManualGeolocation::new();
        map.locate(&mut geo, LocateOptions::default()).unwrap();
        map.stop_locate(&mut geo);
        map.take_events();

        assert!(!geo.is_watching());
        assert!(!map.handle_location_found(LocationFix::new(1.0, 1.0, 10.0)));
        assert!(!map.handle_location_error(LocationError::new(
            LocationErrorCode::Timeout,
            "Timeout"
        )));
        assert!(map.take_events().is_empty());
        assert_eq!(map.viewport().center, LatLng::new(0.0, 0.0));
    }

    #[test]
    fn test_single_shot_locate_stops_after_fix() {
        let mut map = map();
        let mut geo = ManualGeolocation::new();
        let options = LocateOptions {
            watch: false,
            ..Default::default()
        };
        map.locate(&mut geo, options).unwrap();
        assert!(map.handle_location_found(LocationFix::new(1.0, 1.0, 10.0)));
        assert!(!map.is_locating());

        assert!(geo.is_watching());
        map.release_spent_watch(&mut geo);
        assert!(!geo.is_watching());
    }

    #[test]
    fn test_popup_follows_marker_lifetime() {
        let mut map = map();
        let with_popup = map
            .add_layer(Box::new(Marker::new(LatLng::new(1.0, 1.0)).with_popup("hi")))
            .unwrap();
        let without = map.add_layer(Box::new(Marker::new(LatLng::new(1.0, 1.0)))).unwrap();

        assert!(!map.open_popup(without).unwrap());
        assert!(map.open_popup(with_popup).unwrap());
        assert_eq!(map.open_popup_id(), Some(with_popup));

        map.remove_layer(with_popup);
        assert_eq!(map.open_popup_id(), None);
        assert!(map.open_popup(LayerId(999)).is_err());
    }
}
