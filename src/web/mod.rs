//! Browser entry point: binds the widget to the page's DOM and to
//! `navigator.geolocation`, and forwards page interactions as [`AppEvent`]s.

mod document;
mod geolocation;
mod logger;

pub use document::WebDocument;
pub use geolocation::BrowserGeolocation;
pub use logger::ConsoleLogger;

use crate::{
    app::MapApp,
    core::{config::MapConfig, geo::Point},
    dom::{selectors, Document},
    input::{AppEvent, DragTracker},
    layers::base::LayerId,
    rendering::LAYER_ID_ATTRIBUTE,
    ui::{controls::ZoomControl, minimap::MiniMap},
};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{Element, EventTarget, MouseEvent, WheelEvent};

pub type WebApp = MapApp<WebDocument, BrowserGeolocation>;

/// The mounted app and the page listeners feeding it
struct Mounted {
    app: Rc<RefCell<WebApp>>,
    listeners: Vec<Listener>,
}

thread_local! {
    static APP: RefCell<Option<Mounted>> = RefCell::new(None);
}

/// Delivers platform callbacks to the app while it is mounted
#[derive(Clone, Default)]
pub struct EventSink(Rc<RefCell<Weak<RefCell<WebApp>>>>);

impl EventSink {
    fn bind(&self, app: &Rc<RefCell<WebApp>>) {
        *self.0.borrow_mut() = Rc::downgrade(app);
    }

    pub fn send(&self, event: AppEvent) {
        let Some(app) = self.0.borrow().upgrade() else {
            log::trace!("no app for {:?}", event);
            return;
        };
        let Ok(mut app) = app.try_borrow_mut() else {
            log::warn!("dropping {:?}: app is busy", event);
            return;
        };
        if let Err(err) = app.handle(event) {
            log::error!("{}", err);
        }
    }
}

/// A registered DOM listener, kept so it can be removed again
struct Listener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Listener {
    fn add<E>(
        target: &EventTarget,
        name: &'static str,
        mut handler: impl FnMut(E) + 'static,
    ) -> Result<Self, JsValue>
    where
        E: JsCast + 'static,
    {
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            handler(event.unchecked_into::<E>())
        });
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            name,
            closure,
        })
    }

    fn remove(self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref())
        {
            log::warn!("could not remove {} listener: {:?}", self.name, err);
        }
    }
}

fn target_element(event: &web_sys::Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

/// Control under a click on the map container, as the event it triggers
fn control_event(target: &Element) -> Option<Option<AppEvent>> {
    closest(target, ".map-control")?;
    let event = if closest(target, selectors::LOCATE_BUTTON).is_some() {
        Some(AppEvent::LocateButtonClick)
    } else if closest(target, &format!(".{}", ZoomControl::ZOOM_IN_CLASS)).is_some() {
        Some(AppEvent::ZoomIn)
    } else if closest(target, &format!(".{}", ZoomControl::ZOOM_OUT_CLASS)).is_some() {
        Some(AppEvent::ZoomOut)
    } else if closest(target, &format!(".{}", MiniMap::TOGGLE_CLASS)).is_some() {
        Some(AppEvent::MiniMapToggle)
    } else {
        None
    };
    Some(event)
}

fn layer_id_of(element: &Element) -> Option<LayerId> {
    element.get_attribute(LAYER_ID_ATTRIBUTE)?.parse().ok()
}

fn client_point(event: &MouseEvent) -> Point {
    Point::new(event.client_x() as f64, event.client_y() as f64)
}

fn wire(sink: &EventSink, app: &WebApp, container: Element) -> Result<Vec<Listener>, JsValue> {
    let drag = Rc::new(RefCell::new(DragTracker::new()));
    let mut listeners = Vec::new();

    {
        let drag = drag.clone();
        listeners.push(Listener::add(&container, "mousedown", move |event: MouseEvent| {
            let on_control = target_element(&event)
                .and_then(|target| closest(&target, ".map-control"))
                .is_some();
            if !on_control {
                drag.borrow_mut().press(client_point(&event));
            }
        })?);
    }
    {
        let (sink, drag) = (sink.clone(), drag.clone());
        listeners.push(Listener::add(&container, "mousemove", move |event: MouseEvent| {
            let offset = drag.borrow_mut().move_to(client_point(&event));
            if let Some(offset) = offset {
                sink.send(AppEvent::Pan { offset });
            }
        })?);
    }
    if let Some(window) = web_sys::window() {
        let drag = drag.clone();
        listeners.push(Listener::add(&window, "mouseup", move |_: MouseEvent| {
            drag.borrow_mut().release()
        })?);
    }
    {
        let (sink, surface) = (sink.clone(), container.clone());
        listeners.push(Listener::add(&container, "click", move |event: MouseEvent| {
            let Some(target) = target_element(&event) else {
                return;
            };
            if let Some(control) = control_event(&target) {
                if let Some(app_event) = control {
                    event.prevent_default();
                    event.stop_propagation();
                    sink.send(app_event);
                }
                return;
            }
            if drag.borrow().dragged() {
                return;
            }
            if let Some(marker_id) = closest(&target, ".map-marker").and_then(|m| layer_id_of(&m)) {
                sink.send(AppEvent::MarkerClick { marker_id });
                return;
            }
            let rect = surface.get_bounding_client_rect();
            let pixel = client_point(&event) - Point::new(rect.left(), rect.top());
            sink.send(AppEvent::MapClick { pixel });
        })?);
    }
    {
        let sink = sink.clone();
        listeners.push(Listener::add(&container, "wheel", move |event: WheelEvent| {
            event.prevent_default();
            let zoom = if event.delta_y() < 0.0 {
                AppEvent::ZoomIn
            } else {
                AppEvent::ZoomOut
            };
            sink.send(zoom);
        })?);
    }

    let doc = app.document();
    let routes = doc
        .query(&app.config().selectors.routes)
        .and_then(|id| doc.element(id).ok());
    if let Some(routes) = routes {
        let sink = sink.clone();
        let link_selector = format!("a.{}", selectors::MARKER_LINK_CLASS);
        listeners.push(Listener::add(&routes, "click", move |event: MouseEvent| {
            let link = target_element(&event).and_then(|target| closest(&target, &link_selector));
            let Some(marker_id) = link.and_then(|link| link.id().parse().ok()) else {
                return;
            };
            event.prevent_default();
            sink.send(AppEvent::SidebarLinkClick { marker_id });
        })?);
    }

    if let Some(window) = web_sys::window() {
        let (sink, surface) = (sink.clone(), container);
        listeners.push(Listener::add(&window, "resize", move |_: web_sys::Event| {
            let size = Point::new(surface.client_width() as f64, surface.client_height() as f64);
            sink.send(AppEvent::Resize { size });
        })?);
    }

    Ok(listeners)
}

#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
    logger::init();
}

/// Mounts the widget on the page. `config_json` overrides the stock
/// configuration; the container's size replaces the configured one.
#[wasm_bindgen]
pub fn mount(config_json: Option<String>) -> Result<(), JsValue> {
    let to_js = |err: crate::MapError| JsValue::from_str(&err.to_string());

    let mut config = match config_json {
        Some(json) => MapConfig::from_json_str(&json).map_err(to_js)?,
        None => MapConfig::default(),
    };
    let doc = WebDocument::current().map_err(to_js)?;
    let container_id = doc.require(&config.selectors.map_container).map_err(to_js)?;
    let container = doc.element(container_id).map_err(to_js)?;
    if container.client_width() > 0 && container.client_height() > 0 {
        config.size = (container.client_width() as f64, container.client_height() as f64);
    }

    // a second mount replaces the first instead of stacking listeners
    unmount()?;

    let sink = EventSink::default();
    let geolocation = BrowserGeolocation::new(sink.clone());
    let app = Rc::new(RefCell::new(
        MapApp::new(config, doc, geolocation).map_err(to_js)?,
    ));
    sink.bind(&app);
    let listeners = wire(&sink, &app.borrow(), container)?;

    log::info!("mounted on {}", app.borrow().config().selectors.map_container);
    APP.with(|slot| *slot.borrow_mut() = Some(Mounted { app, listeners }));
    Ok(())
}

/// Removes the page listeners, stops locating and drops the widget.
/// Callbacks still in flight find no app and are ignored.
#[wasm_bindgen]
pub fn unmount() -> Result<(), JsValue> {
    let Some(Mounted { app, listeners }) = APP.with(|slot| slot.borrow_mut().take()) else {
        return Ok(());
    };
    let count = listeners.len();
    listeners.into_iter().for_each(Listener::remove);

    let result = app.borrow_mut().stop_locating();
    drop(app);
    log::info!("unmounted, {} listeners removed", count);
    result.map_err(|err| JsValue::from_str(&err.to_string()))
}
