//! Position fixes, locate options and the platform geolocation seam.

use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A successful position report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub lat_lng: LatLng,
    /// Estimated error radius in meters
    pub accuracy: f64,
    /// Platform timestamp in milliseconds since the epoch
    pub timestamp: f64,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            lat_lng: LatLng::new(latitude, longitude),
            accuracy,
            timestamp: 0.0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// W3C geolocation error codes, plus `Unsupported` for platforms without the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationErrorCode {
    Unsupported = 0,
    PermissionDenied = 1,
    PositionUnavailable = 2,
    Timeout = 3,
}

impl LocationErrorCode {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unsupported,
        }
    }
}

/// A failed position request; shown to the user, never fatal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationError {
    pub code: LocationErrorCode,
    pub message: String,
}

impl LocationError {
    pub fn new(code: LocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unsupported() -> Self {
        Self::new(LocationErrorCode::Unsupported, "Geolocation not supported.")
    }
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LocationError {}

/// How a locate request behaves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocateOptions {
    /// Keep reporting positions until stopped
    pub watch: bool,
    /// Recenter the map on every fix
    pub set_view: bool,
    /// Upper bound for the auto-zoom on a fix
    pub max_zoom: Option<f64>,
    pub enable_high_accuracy: bool,
    pub timeout_ms: u32,
    pub maximum_age_ms: u32,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            watch: true,
            set_view: true,
            max_zoom: None,
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
        }
    }
}

/// Handle of an active position watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub i32);

/// Platform location service.
///
/// Fixes and errors are delivered asynchronously by the platform as
/// [`crate::input::AppEvent::LocationFound`] / [`crate::input::AppEvent::LocationError`];
/// the service itself only starts and stops watches.
pub trait GeolocationService {
    /// Starts watching; an error means the watch could not be started at all
    fn watch_position(&mut self, options: &LocateOptions) -> Result<WatchId, LocationError>;

    /// Stops a watch; unknown ids are ignored
    fn clear_watch(&mut self, id: WatchId);
}

/// Service whose positions are fed in by hand: tests and headless rendering
#[derive(Debug, Default)]
pub struct ManualGeolocation {
    next_id: i32,
    watches: Vec<(WatchId, LocateOptions)>,
    unavailable: Option<LocationError>,
}

impl ManualGeolocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A service that refuses every watch with `error`
    pub fn unavailable(error: LocationError) -> Self {
        Self {
            unavailable: Some(error),
            ..Self::default()
        }
    }

    pub fn is_watching(&self) -> bool {
        !self.watches.is_empty()
    }

    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }

    /// Options of the most recent active watch
    pub fn last_options(&self) -> Option<&LocateOptions> {
        self.watches.last().map(|(_, options)| options)
    }
}

impl GeolocationService for ManualGeolocation {
    fn watch_position(&mut self, options: &LocateOptions) -> Result<WatchId, LocationError> {
        if let Some(error) = &self.unavailable {
            return Err(error.clone());
        }
        self.next_id += 1;
        let id = WatchId(self.next_id);
        self.watches.push((id, options.clone()));
        Ok(id)
    }

    fn clear_watch(&mut self, id: WatchId) {
        self.watches.retain(|(watch, _)| *watch != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_watch_lifecycle() {
        let mut geo = ManualGeolocation::new();
        let first = geo.watch_position(&LocateOptions::default()).unwrap();
        let second = geo.watch_position(&LocateOptions::default()).unwrap();
        assert_ne!(first, second);
        assert_eq!(geo.active_watches(), 2);

        geo.clear_watch(first);
        geo.clear_watch(WatchId(99));
        assert_eq!(geo.active_watches(), 1);
        assert!(geo.last_options().unwrap().enable_high_accuracy);
    }

    #[test]
    fn test_unavailable_service() {
        let mut geo = ManualGeolocation::unavailable(LocationError::unsupported());
        let err = geo.watch_position(&LocateOptions::default()).unwrap_err();

        assert_eq!(err.code, LocationErrorCode::Unsupported);
        assert!(!geo.is_watching());
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(
            LocationErrorCode::from_code(1),
            LocationErrorCode::PermissionDenied
        );
        assert_eq!(LocationErrorCode::from_code(3), LocationErrorCode::Timeout);
        assert_eq!(LocationErrorCode::from_code(42), LocationErrorCode::Unsupported);
    }
}
