use crate::{
    geolocation::{
        GeolocationService, LocateOptions, LocationError, LocationErrorCode, LocationFix, WatchId,
    },
    input::AppEvent,
};
use js_sys::{Object, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::PositionOptions;

use super::EventSink;

type PositionCallback = Closure<dyn FnMut(JsValue)>;

/// `navigator.geolocation`, delivering fixes and errors to an [`EventSink`]
pub struct BrowserGeolocation {
    geolocation: Option<web_sys::Geolocation>,
    sink: EventSink,
    /// Callbacks of the running watch; dropped once it is cleared
    callbacks: Option<(WatchId, PositionCallback, PositionCallback)>,
}

impl BrowserGeolocation {
    pub fn new(sink: EventSink) -> Self {
        let geolocation = web_sys::window().and_then(|window| window.navigator().geolocation().ok());
        if geolocation.is_none() {
            log::warn!("geolocation is not available in this browser");
        }
        Self {
            geolocation,
            sink,
            callbacks: None,
        }
    }
}

fn number(value: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(value, &JsValue::from_str(key)).ok()?.as_f64()
}

fn position_to_fix(position: &JsValue) -> Option<LocationFix> {
    let coords = Reflect::get(position, &JsValue::from_str("coords")).ok()?;
    let fix = LocationFix::new(
        number(&coords, "latitude")?,
        number(&coords, "longitude")?,
        number(&coords, "accuracy")?,
    );
    Some(match number(position, "timestamp") {
        Some(timestamp) => fix.with_timestamp(timestamp),
        None => fix,
    })
}

fn position_error(error: &JsValue) -> LocationError {
    let code = number(error, "code").unwrap_or(0.0) as u16;
    let message = Reflect::get(error, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_default();
    LocationError::new(LocationErrorCode::from_code(code), message)
}

fn position_options(options: &LocateOptions) -> Result<PositionOptions, JsValue> {
    let object = Object::new();
    Reflect::set(
        &object,
        &"enableHighAccuracy".into(),
        &options.enable_high_accuracy.into(),
    )?;
    Reflect::set(&object, &"timeout".into(), &(options.timeout_ms as f64).into())?;
    Reflect::set(
        &object,
        &"maximumAge".into(),
        &(options.maximum_age_ms as f64).into(),
    )?;
    Ok(object.unchecked_into())
}

impl GeolocationService for BrowserGeolocation {
    fn watch_position(&mut self, options: &LocateOptions) -> Result<WatchId, LocationError> {
        let geolocation = self
            .geolocation
            .as_ref()
            .ok_or_else(LocationError::unsupported)?;

        let sink = self.sink.clone();
        let on_success: PositionCallback = Closure::new(move |position: JsValue| {
            match position_to_fix(&position) {
                Some(fix) => sink.send(AppEvent::LocationFound(fix)),
                None => log::warn!("malformed position: {:?}", position),
            }
        });
        let sink = self.sink.clone();
        let on_error: PositionCallback = Closure::new(move |error: JsValue| {
            sink.send(AppEvent::LocationError(position_error(&error)));
        });

        let js_options = position_options(options).map_err(|err| {
            LocationError::new(LocationErrorCode::Unsupported, format!("{err:?}"))
        })?;
        let id = geolocation
            .watch_position_with_error_callback_and_options(
                on_success.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
                &js_options,
            )
            .map_err(|err| LocationError::new(LocationErrorCode::Unsupported, format!("{err:?}")))?;

        let watch = WatchId(id);
        self.callbacks = Some((watch, on_success, on_error));
        Ok(watch)
    }

    fn clear_watch(&mut self, id: WatchId) {
        if let Some(geolocation) = &self.geolocation {
            geolocation.clear_watch(id.0);
        }
        if matches!(&self.callbacks, Some((watch, _, _)) if *watch == id) {
            self.callbacks = None;
        }
    }
}
