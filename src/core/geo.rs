use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Sphere radius of the Web Mercator projection, in meters.
pub const EARTH_RADIUS: f64 = 6378137.0;
/// Latitude at which the Mercator square ends.
pub const MAX_LATITUDE: f64 = 85.0511287798;

const EARTH_CIRCUMFERENCE: f64 = 40075017.0;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are inside their geographic ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
    }

    /// Square of `size_m` meters per side around this position.
    ///
    /// The longitude half-width grows with `1 / cos(lat)` so the box stays
    /// square on the ground.
    pub fn to_bounds(&self, size_m: f64) -> LatLngBounds {
        let half_lat = 180.0 * size_m / EARTH_CIRCUMFERENCE;
        let half_lng = half_lat / (self.lat * PI / 180.0).cos();

        LatLngBounds::from_coords(
            self.lat - half_lat,
            self.lng - half_lng,
            self.lat + half_lat,
            self.lng + half_lng,
        )
    }
}

// six decimals; adding 0.0 turns -0.0 into 0.0
fn format_num(value: f64) -> f64 {
    (value * 1e6).round() / 1e6 + 0.0
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LatLng({}, {})", format_num(self.lat), format_num(self.lng))
    }
}

/// Pixel position, either container-relative or in projected space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, factor: f64) -> Point {
        Point { x: self.x * factor, y: self.y * factor }
    }
}

/// Axis-aligned geographic box. Does not handle the antimeridian.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self { south_west, north_east }
    }

    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Whole-globe box used by the initial fit.
    pub fn world() -> Self {
        Self::from_coords(-90.0, -180.0, 90.0, 180.0)
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }

    pub fn center(&self) -> LatLng {
        let sw = self.south_west;
        let ne = self.north_east;
        LatLng::new((sw.lat + ne.lat) * 0.5, (sw.lng + ne.lng) * 0.5)
    }

    fn lat_range(&self) -> std::ops::RangeInclusive<f64> {
        self.south_west.lat..=self.north_east.lat
    }

    fn lng_range(&self) -> std::ops::RangeInclusive<f64> {
        self.south_west.lng..=self.north_east.lng
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        self.lat_range().contains(&point.lat) && self.lng_range().contains(&point.lng)
    }

    /// Touching edges count as intersecting.
    pub fn intersects(&self, other: &LatLngBounds) -> bool {
        let lat_overlap = self.south_west.lat <= other.north_east.lat
            && other.south_west.lat <= self.north_east.lat;
        let lng_overlap = self.south_west.lng <= other.north_east.lng
            && other.south_west.lng <= self.north_east.lng;
        lat_overlap && lng_overlap
    }
}

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    pub fn is_valid(&self) -> bool {
        let side = 1u32 << self.z;
        self.x < side && self.y < side
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_ranges() {
        assert!(LatLng::new(36.3134, -6.1659).is_valid());
        assert!(LatLng::new(-90.0, 180.0).is_valid());
        assert!(!LatLng::new(90.5, 0.0).is_valid());
        assert!(!LatLng::new(0.0, -181.0).is_valid());
    }

    #[test]
    fn test_clamp_lat_stops_at_mercator_edge() {
        assert_eq!(LatLng::clamp_lat(89.0), MAX_LATITUDE);
        assert_eq!(LatLng::clamp_lat(-89.0), -MAX_LATITUDE);
        assert_eq!(LatLng::clamp_lat(36.3), 36.3);
    }

    #[test]
    fn test_display_rounds_to_six_places() {
        let mar_del_plata = LatLng::new(-37.889923, -58.265049);
        assert_eq!(mar_del_plata.to_string(), "LatLng(-37.889923, -58.265049)");
        assert_eq!(LatLng::new(12.12345678, 5.0).to_string(), "LatLng(12.123457, 5)");
        assert_eq!(LatLng::new(-0.0000001, 0.0).to_string(), "LatLng(0, 0)");
    }

    #[test]
    fn test_to_bounds_square_on_ground() {
        let la_barrosa = LatLng::new(36.3134, -6.1659);
        let bounds = la_barrosa.to_bounds(500.0);
        let center = bounds.center();

        assert!((center.lat - la_barrosa.lat).abs() < 1e-9);
        assert!((center.lng - la_barrosa.lng).abs() < 1e-9);
        let lat_span = bounds.north_east.lat - bounds.south_west.lat;
        let lng_span = bounds.north_east.lng - bounds.south_west.lng;
        assert!(lng_span > lat_span);
        assert!(bounds.contains(&la_barrosa));
    }

    #[test]
    fn test_point_operators() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(1.0, 1.0);
        assert_eq!(a + b, Point::new(4.0, 5.0));
        assert_eq!(a - b, Point::new(2.0, 3.0));
        assert_eq!(a * 0.5, Point::new(1.5, 2.0));
    }

    #[test]
    fn test_bounds_intersection_and_corners() {
        let andalusia = LatLngBounds::from_coords(36.0, -7.5, 38.7, -1.6);
        let cadiz_coast = LatLngBounds::from_coords(36.1, -6.4, 36.6, -5.9);
        let buenos_aires = LatLngBounds::from_coords(-41.0, -63.0, -33.0, -56.0);

        assert!(andalusia.intersects(&cadiz_coast));
        assert!(!andalusia.intersects(&buenos_aires));
        assert_eq!(andalusia.north_west(), LatLng::new(38.7, -7.5));
        assert_eq!(andalusia.south_east(), LatLng::new(36.0, -1.6));
        assert!(LatLngBounds::world().contains(&LatLng::new(-37.9, -58.3)));
    }

    #[test]
    fn test_tile_coord_range() {
        assert!(TileCoord::new(1, 1, 1).is_valid());
        assert!(!TileCoord::new(2, 0, 1).is_valid());
        assert!(TileCoord::new(0, 0, 0).is_valid());
    }
}
