use crate::core::constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point, EARTH_RADIUS};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Manages the current view of the map: center, zoom, and screen dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
    /// The minimum allowed zoom level
    pub min_zoom: f64,
    /// The maximum allowed zoom level
    pub max_zoom: f64,
}

impl Viewport {
    /// Creates a new viewport
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self {
            center,
            zoom: zoom.clamp(DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM),
            size,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }

    /// Sets the center and zoom in one step, clamping the zoom
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.set_zoom(zoom);
    }

    /// Sets the center of the viewport
    pub fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    /// Sets the zoom level, clamping to valid range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Sets the viewport size
    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    /// Sets the zoom limits
    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.zoom = self.zoom.clamp(min_zoom, max_zoom);
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> f64 {
        2_f64.powf(self.zoom)
    }

    /// Projects a LatLng to world pixel coordinates at the given zoom level
    /// (Web Mercator, EPSG:3857)
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        let z = zoom.unwrap_or(self.zoom);
        let scale = TILE_SIZE as f64 * 2_f64.powf(z);

        let lat = LatLng::clamp_lat(lat_lng.lat);
        let x = lat_lng.lng.to_radians() * EARTH_RADIUS;
        let y = (PI / 4.0 + lat.to_radians() / 2.0).tan().ln() * EARTH_RADIUS;

        // Raw Mercator meters to pixels: scale = 0.5 / (pi * R), offset = 0.5
        let pixel_x = (x + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;
        let pixel_y = (-y + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale;

        Point::new(pixel_x, pixel_y)
    }

    /// Unprojects world pixel coordinates back to LatLng at the given zoom level
    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        let z = zoom.unwrap_or(self.zoom);
        let scale = TILE_SIZE as f64 * 2_f64.powf(z);

        let x = (pixel.x / scale) * (2.0 * PI * EARTH_RADIUS) - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * (2.0 * PI * EARTH_RADIUS);

        let lng = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0).to_degrees();

        LatLng::new(lat, lng)
    }

    /// World pixel coordinate of the container's top-left corner
    pub fn pixel_origin(&self) -> Point {
        self.project(&self.center, None) - self.size * 0.5
    }

    /// Converts a geographical coordinate to container-relative pixels
    pub fn lat_lng_to_container_point(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None) - self.pixel_origin()
    }

    /// Converts container-relative pixels to a geographical coordinate
    pub fn container_point_to_lat_lng(&self, point: &Point) -> LatLng {
        self.unproject(&(self.pixel_origin() + *point), None)
    }

    /// World pixel bounds covered by the container: (top-left, bottom-right)
    pub fn pixel_bounds(&self) -> (Point, Point) {
        let origin = self.pixel_origin();
        (origin, origin + self.size)
    }

    /// Geographic bounds currently visible
    pub fn bounds(&self) -> LatLngBounds {
        let south_west = self.container_point_to_lat_lng(&Point::new(0.0, self.size.y));
        let north_east = self.container_point_to_lat_lng(&Point::new(self.size.x, 0.0));
        LatLngBounds::new(south_west, north_east)
    }

    /// Ground resolution at the given latitude for the current zoom
    pub fn meters_per_pixel(&self, lat: f64) -> f64 {
        2.0 * PI * EARTH_RADIUS * lat.to_radians().cos() / (TILE_SIZE as f64 * self.scale())
    }

    /// Moves the view by a pixel offset
    pub fn pan_by(&mut self, offset: Point) {
        let center_px = self.project(&self.center, None) + offset;
        self.center = self.unproject(&center_px, None);
    }

    /// Largest whole zoom level at which `bounds` fits inside the container
    pub fn bounds_zoom(&self, bounds: &LatLngBounds) -> f64 {
        let north_west = self.project(&bounds.north_west(), None);
        let south_east = self.project(&bounds.south_east(), None);
        let bounds_size = south_east - north_west;

        if bounds_size.x <= 0.0 || bounds_size.y <= 0.0 {
            return self.max_zoom;
        }
        if self.size.x <= 0.0 || self.size.y <= 0.0 {
            return self.min_zoom;
        }

        let scale = (self.size.x / bounds_size.x).min(self.size.y / bounds_size.y);
        let zoom = (self.zoom + scale.log2()).floor();
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    /// Centers on `bounds` at the largest zoom that shows all of it
    pub fn fit_bounds(&mut self, bounds: &LatLngBounds) {
        let zoom = self.bounds_zoom(bounds);
        let south_west = self.project(&bounds.south_west, Some(zoom));
        let north_east = self.project(&bounds.north_east, Some(zoom));
        let center_px = (south_west + north_east) * 0.5;

        self.center = self.unproject(&center_px, Some(zoom));
        self.zoom = zoom;
    }

    /// Fits the whole world into the container
    pub fn fit_world(&mut self) {
        self.fit_bounds(&LatLngBounds::world());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(0.0, 0.0), 2.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = viewport();
        vp.set_zoom(25.0);
        assert_eq!(vp.zoom, 18.0);

        vp.set_zoom_limits(0.0, 13.0);
        assert_eq!(vp.zoom, 13.0);
        vp.set_zoom(-1.0);
        assert_eq!(vp.zoom, 0.0);
    }

    #[test]
    fn test_project_round_trip() {
        let vp = viewport();
        let coord = LatLng::new(-37.889923, -58.265049);
        let back = vp.unproject(&vp.project(&coord, None), None);

        assert!((back.lat - coord.lat).abs() < 1e-9);
        assert!((back.lng - coord.lng).abs() < 1e-9);
    }

    #[test]
    fn test_container_center_is_view_center() {
        let mut vp = viewport();
        vp.set_view(LatLng::new(48.8566, 2.3522), 12.0);
        let center = vp.container_point_to_lat_lng(&Point::new(400.0, 300.0));

        assert!((center.lat - 48.8566).abs() < 1e-9);
        assert!((center.lng - 2.3522).abs() < 1e-9);

        let px = vp.lat_lng_to_container_point(&LatLng::new(48.8566, 2.3522));
        assert!((px.x - 400.0).abs() < 1e-6);
        assert!((px.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_world() {
        let mut vp = viewport();
        vp.fit_world();

        // 600px tall container fits a 512px world at zoom 1
        assert_eq!(vp.zoom, 1.0);
        assert!(vp.center.lat.abs() < 1e-9);
        assert!(vp.center.lng.abs() < 1e-9);
    }

    #[test]
    fn test_bounds_zoom_grows_for_small_bounds() {
        let vp = viewport();
        let small = LatLng::new(10.0, 10.0).to_bounds(200.0);
        let zoom = vp.bounds_zoom(&small);

        assert!(zoom > 10.0);
        assert!(zoom <= 18.0);
        assert_eq!(zoom, zoom.floor());
    }

    #[test]
    fn test_pan_by_moves_center() {
        let mut vp = viewport();
        vp.pan_by(Point::new(100.0, 0.0));
        assert!(vp.center.lng > 0.0);
        assert!(vp.center.lat.abs() < 1e-9);
    }

    #[test]
    fn test_meters_per_pixel_shrinks_with_zoom() {
        let mut vp = viewport();
        let coarse = vp.meters_per_pixel(0.0);
        vp.set_zoom(3.0);
        assert!((coarse / vp.meters_per_pixel(0.0) - 2.0).abs() < 1e-9);
    }
}
