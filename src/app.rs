//! The assembled widget: map surface, controls, sidebar and readout bound to
//! one page and one location service.

use crate::{
    core::{
        config::MapConfig,
        geo::{LatLng, Point},
        map::{Map, MapOptions},
        viewport::Viewport,
    },
    dom::Document,
    geolocation::GeolocationService,
    input::{AppEvent, MapEvent},
    rendering::DomRenderer,
    ui::{
        controls::{Attribution, ZoomControl},
        locate::{InitialLocate, LocateControl},
        minimap::MiniMap,
        readout::ClickReadout,
        sidebar::PoiSidebar,
    },
    MapError, Result,
};

pub struct MapApp<D: Document, G: GeolocationService> {
    config: MapConfig,
    map: Map,
    doc: D,
    geolocation: G,
    renderer: DomRenderer,
    attribution: Option<Attribution>,
    zoom: Option<ZoomControl>,
    minimap: Option<MiniMap>,
    locate: LocateControl,
    initial_locate: InitialLocate,
    sidebar: PoiSidebar,
    readout: ClickReadout,
}

impl<D: Document, G: GeolocationService> MapApp<D, G> {
    pub fn new(config: MapConfig, doc: D, geolocation: G) -> Result<Self> {
        Self::with_options(config, MapOptions::default(), doc, geolocation)
    }

    /// Builds the page: world view, base tiles, mini-map, locate button and
    /// sidebar, then draws the first frame
    pub fn with_options(
        config: MapConfig,
        options: MapOptions,
        mut doc: D,
        mut geolocation: G,
    ) -> Result<Self> {
        config.validate()?;
        let container = doc.require(&config.selectors.map_container)?;

        let size = Point::new(config.size.0, config.size.1);
        let mut map = Map::with_options(Viewport::new(LatLng::default(), 0.0, size), options);
        map.controls_mut().mount(container);
        let mut renderer = DomRenderer::new();
        renderer.mount(&mut doc, container)?;

        map.fit_world();
        map.add_layer(Box::new(config.tile.build_layer()))?;

        let attribution = if map.options().attribution_control {
            Some(Attribution::mount(&mut map, &mut doc)?)
        } else {
            None
        };
        let zoom = if map.options().zoom_control {
            Some(ZoomControl::mount(&mut map, &mut doc)?)
        } else {
            None
        };

        let minimap = if config.minimap.enabled {
            let layer = config.minimap.tile_config(&config.tile).build_layer();
            let mut minimap = MiniMap::new(layer, &config.minimap);
            minimap.mount(&mut map, &mut doc)?;
            renderer.mount_minimap(&mut doc, &minimap)?;
            Some(minimap)
        } else {
            None
        };

        let mut locate = LocateControl::new(&config.locate)
            .with_legend_selector(config.selectors.description.clone());
        locate.mount(&mut map, &mut doc)?;

        let mut initial_locate = InitialLocate::new(&config.locate.on_load, &config.locate.options);
        if config.locate.on_load.enabled {
            if let Err(error) = initial_locate.start(&mut map, &mut geolocation) {
                locate.show_error(&mut map, &mut doc, &error)?;
            }
        }

        let sidebar = PoiSidebar::mount(&mut map, &mut doc, &config.selectors.routes, &config.points)?;
        let readout = ClickReadout::new(config.selectors.marker_position.clone());

        // setup events have no listeners yet
        map.take_events();

        let mut app = Self {
            config,
            map,
            doc,
            geolocation,
            renderer,
            attribution,
            zoom,
            minimap,
            locate,
            initial_locate,
            sidebar,
            readout,
        };
        app.refresh()?;

        log::info!(
            "map ready: {} layers, {} sidebar entries",
            app.map.layer_count(),
            app.sidebar.entries().len()
        );
        Ok(app)
    }

    /// Applies one interaction or platform callback and redraws
    pub fn handle(&mut self, event: AppEvent) -> Result<()> {
        log::trace!("event: {:?}", event);
        match event {
            AppEvent::MapClick { pixel } => {
                self.map.close_popup();
                self.map.click_at(pixel);
            }
            AppEvent::LocateButtonClick => {
                // the button's request replaces the one made on load
                self.initial_locate.cancel();
                self.locate
                    .toggle(&mut self.map, &mut self.doc, &mut self.geolocation)?;
            }
            AppEvent::SidebarLinkClick { marker_id } => {
                self.sidebar.on_link_click(&mut self.map, marker_id)?;
            }
            AppEvent::MarkerClick { marker_id } => {
                self.sidebar.on_marker_click(marker_id);
                self.map.open_popup(marker_id)?;
            }
            AppEvent::MiniMapToggle => {
                if let Some(minimap) = self.minimap.as_mut() {
                    minimap.toggle_display(&mut self.doc)?;
                }
            }
            AppEvent::ZoomIn => self.map.zoom_in(),
            AppEvent::ZoomOut => self.map.zoom_out(),
            AppEvent::Pan { offset } => self.map.pan_by(offset),
            AppEvent::Resize { size } => self.map.set_size(size),
            AppEvent::LocationFound(fix) => {
                self.map.handle_location_found(fix);
                self.map.release_spent_watch(&mut self.geolocation);
            }
            AppEvent::LocationError(error) => {
                self.map.handle_location_error(error);
                self.map.release_spent_watch(&mut self.geolocation);
            }
        }

        // a failing reaction must not leave the page showing a stale frame
        let dispatched = self.dispatch_map_events();
        self.refresh()?;
        dispatched
    }

    /// Ends every position lookup and clears its platform watch, before the
    /// widget is torn down
    pub fn stop_locating(&mut self) -> Result<()> {
        self.initial_locate.cancel();
        if self.locate.is_active() {
            self.locate
                .toggle(&mut self.map, &mut self.doc, &mut self.geolocation)?;
        }
        self.map.stop_locate(&mut self.geolocation);
        Ok(())
    }

    /// Jumps to the sidebar entry titled `title`
    pub fn select_point(&mut self, title: &str) -> Result<()> {
        let marker_id = self
            .sidebar
            .entry_by_title(title)
            .map(|entry| entry.marker_id)
            .ok_or_else(|| MapError::UnknownEntry(title.to_string()))?;
        self.handle(AppEvent::SidebarLinkClick { marker_id })
    }

    /// Routes every queued map event, continuing past failures; the first
    /// failure is returned once the queue is empty
    fn dispatch_map_events(&mut self) -> Result<()> {
        let mut first_error = None;
        loop {
            let events = self.map.take_events();
            if events.is_empty() {
                return first_error.map_or(Ok(()), Err);
            }
            for event in events {
                if let Err(error) = self.route(event) {
                    log::warn!("map event failed: {}", error);
                    first_error.get_or_insert(error);
                }
            }
        }
    }

    fn route(&mut self, event: MapEvent) -> Result<()> {
        match event {
            MapEvent::Click { lat_lng, .. } => self.readout.show(&mut self.doc, lat_lng),
            MapEvent::LocationFound(fix) => {
                if !self.initial_locate.on_location_found(&mut self.map, &fix)? {
                    self.locate.on_location_found(&mut self.map, &fix)?;
                }
                Ok(())
            }
            MapEvent::LocationError(error) => {
                if self.initial_locate.on_location_error() {
                    self.locate.show_error(&mut self.map, &mut self.doc, &error)
                } else {
                    self.locate
                        .on_location_error(&mut self.map, &mut self.doc, &error)
                }
            }
            _ => Ok(()),
        }
    }

    /// Syncs the controls and the inset with the view and redraws
    fn refresh(&mut self) -> Result<()> {
        if let Some(attribution) = &self.attribution {
            attribution.update(&self.map, &mut self.doc)?;
        }
        if let Some(zoom) = &self.zoom {
            zoom.update(&self.map, &mut self.doc)?;
        }
        self.renderer.render(&mut self.doc, &self.map)?;

        if let Some(minimap) = self.minimap.as_mut() {
            minimap.sync(self.map.viewport());
            self.renderer.render_minimap(&mut self.doc, minimap)?;
        }
        Ok(())
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn geolocation(&self) -> &G {
        &self.geolocation
    }

    pub fn geolocation_mut(&mut self) -> &mut G {
        &mut self.geolocation
    }

    pub fn locate(&self) -> &LocateControl {
        &self.locate
    }

    pub fn initial_locate(&self) -> &InitialLocate {
        &self.initial_locate
    }

    pub fn sidebar(&self) -> &PoiSidebar {
        &self.sidebar
    }

    pub fn minimap(&self) -> Option<&MiniMap> {
        self.minimap.as_ref()
    }

    pub fn readout(&self) -> &ClickReadout {
        &self.readout
    }

    pub fn renderer(&self) -> &DomRenderer {
        &self.renderer
    }
}
