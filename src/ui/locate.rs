//! Location toggle button, and the one-shot lookup made on page load.
//!
//! While active the map watches the device position; every fix replaces the
//! accuracy circle and the position marker, and every failure is written into
//! a single legend box in the bottom-left corner.

use crate::{
    core::{
        config::{LocateConfig, OnLoadLocateConfig},
        constants::{ACCURACY_RADIUS_DIVISOR, LOCATED_ICON_SIZE},
        map::Map,
    },
    dom::{selectors, Document, ElementId, SimpleSelector},
    geolocation::{GeolocationService, LocateOptions, LocationError, LocationFix},
    layers::{
        base::LayerId,
        group::FeatureGroup,
        marker::{DivIcon, Icon, Marker},
        vector::{Circle, PathStyle},
    },
    ui::controls::Position,
    Result,
};
use instant::{Duration, Instant};

const LOCATE_ICON: &str = r#"<svg viewBox="0 0 24 24" width="18" height="18"><circle cx="12" cy="12" r="4"/><path d="M12 2v4M12 18v4M2 12h4M18 12h4" stroke="currentColor" stroke-width="2"/></svg>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocateState {
    #[default]
    Inactive,
    Active,
}

/// Surface handles of the transient location overlays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationMarkers {
    pub marker: Option<LayerId>,
    pub circle: Option<LayerId>,
}

impl LocationMarkers {
    pub fn is_empty(&self) -> bool {
        self.marker.is_none() && self.circle.is_none()
    }

    /// Removes both overlays from the map
    fn clear(&mut self, map: &mut Map) {
        for id in [self.marker.take(), self.circle.take()].into_iter().flatten() {
            map.remove_layer(id);
        }
    }
}

pub struct LocateControl {
    options: LocateOptions,
    position: Position,
    title: String,
    legend_selector: String,
    state: LocateState,
    markers: LocationMarkers,
    button: Option<ElementId>,
    legend: Option<ElementId>,
    last_fix: Option<(LocationFix, Instant)>,
}

impl LocateControl {
    pub const NAME: &'static str = "locate";
    const LEGEND_NAME: &'static str = "legend";
    /// Class tagging the accuracy circle
    pub const CIRCLE_CLASS: &'static str = "locate-circle";
    /// Class tagging the position marker
    pub const MARKER_CLASS: &'static str = "located-animation";
    pub const POPUP_TEXT: &'static str = "You are here :)";

    pub fn new(config: &LocateConfig) -> Self {
        Self {
            options: config.options.clone(),
            position: config.position,
            title: config.title.clone(),
            legend_selector: selectors::DESCRIPTION.to_string(),
            state: LocateState::Inactive,
            markers: LocationMarkers::default(),
            button: None,
            legend: None,
            last_fix: None,
        }
    }

    /// Selector of the legend element; a page element matching it is reused
    pub fn with_legend_selector(mut self, selector: impl Into<String>) -> Self {
        self.legend_selector = selector.into();
        self
    }

    /// Creates the button in its corner
    pub fn mount(&mut self, map: &mut Map, doc: &mut dyn Document) -> Result<ElementId> {
        let button = map.controls_mut().create_control(
            doc,
            Self::NAME,
            self.position,
            "locate-button map-bar",
        )?;
        doc.set_attribute(button, "title", &self.title)?;
        doc.set_inner_html(button, LOCATE_ICON)?;
        self.button = Some(button);
        Ok(button)
    }

    /// Flips between watching and idle, returning the new state
    pub fn toggle(
        &mut self,
        map: &mut Map,
        doc: &mut dyn Document,
        geolocation: &mut dyn GeolocationService,
    ) -> Result<LocateState> {
        match self.state {
            LocateState::Inactive => self.activate(map, doc, geolocation)?,
            LocateState::Active => self.deactivate(map, doc, geolocation)?,
        }
        Ok(self.state)
    }

    fn activate(
        &mut self,
        map: &mut Map,
        doc: &mut dyn Document,
        geolocation: &mut dyn GeolocationService,
    ) -> Result<()> {
        self.state = LocateState::Active;
        if let Some(button) = self.button {
            doc.add_class(button, selectors::LOCATE_ACTIVE_CLASS)?;
        }
        log::info!("locating");

        // a watch that cannot start is reported like any other failure
        if let Err(error) = map.locate(geolocation, self.options.clone()) {
            self.on_location_error(map, doc, &error)?;
        }
        Ok(())
    }

    fn deactivate(
        &mut self,
        map: &mut Map,
        doc: &mut dyn Document,
        geolocation: &mut dyn GeolocationService,
    ) -> Result<()> {
        map.stop_locate(geolocation);
        self.markers.clear(map);
        self.last_fix = None;
        if let Some(button) = self.button {
            doc.remove_class(button, selectors::LOCATE_ACTIVE_CLASS)?;
        }
        self.state = LocateState::Inactive;
        log::info!("stopped locating");
        Ok(())
    }

    /// Replaces the overlays with ones for `fix`; ignored while inactive
    pub fn on_location_found(&mut self, map: &mut Map, fix: &LocationFix) -> Result<bool> {
        if self.state != LocateState::Active {
            log::trace!("ignoring location fix while inactive");
            return Ok(false);
        }
        self.markers.clear(map);

        let circle = Circle::new(fix.lat_lng, fix.accuracy / ACCURACY_RADIUS_DIVISOR).with_style(
            PathStyle {
                class_name: Some(Self::CIRCLE_CLASS.to_string()),
                stroke: false,
                weight: 2.0,
                fill_color: "#136aec".to_string(),
                fill_opacity: 0.15,
                ..Default::default()
            },
        );
        let icon = DivIcon::new(Self::MARKER_CLASS, (LOCATED_ICON_SIZE, LOCATED_ICON_SIZE))
            .with_popup_anchor((0, -15));
        let marker = Marker::new(fix.lat_lng)
            .with_icon(Icon::Div(icon))
            .with_popup(Self::POPUP_TEXT);

        let ids = FeatureGroup::new()
            .with_layer(circle)
            .with_layer(marker)
            .add_to(map)?;
        self.markers = LocationMarkers {
            circle: ids.first().copied(),
            marker: ids.get(1).copied(),
        };
        match self.last_fix_age() {
            Some(age) => log::debug!(
                "located at {} (accuracy {} m, {} ms after the previous fix)",
                fix.lat_lng,
                fix.accuracy,
                age.as_millis()
            ),
            None => log::debug!("located at {} (accuracy {} m)", fix.lat_lng, fix.accuracy),
        }
        self.last_fix = Some((*fix, Instant::now()));
        Ok(true)
    }

    /// Shows the failure in the legend; the toggle state is left alone
    pub fn on_location_error(
        &mut self,
        map: &mut Map,
        doc: &mut dyn Document,
        error: &LocationError,
    ) -> Result<()> {
        if self.state != LocateState::Active {
            log::trace!("ignoring location error while inactive");
            return Ok(());
        }
        self.show_error(map, doc, error)
    }

    /// Writes `error` into the legend whatever the toggle state
    pub fn show_error(
        &mut self,
        map: &mut Map,
        doc: &mut dyn Document,
        error: &LocationError,
    ) -> Result<()> {
        let legend = self.legend(map, doc)?;
        doc.set_text(legend, &error.message)
    }

    /// The single legend element, created on first use
    fn legend(&mut self, map: &mut Map, doc: &mut dyn Document) -> Result<ElementId> {
        if let Some(legend) = self.legend {
            return Ok(legend);
        }
        let legend = match doc.query(&self.legend_selector) {
            Some(existing) => existing,
            None => {
                let selector = SimpleSelector::parse(&self.legend_selector)?;
                let legend = map.controls_mut().create_control(
                    doc,
                    Self::LEGEND_NAME,
                    Position::BottomLeft,
                    &selector.classes.join(" "),
                )?;
                if let Some(id) = &selector.id {
                    doc.set_attribute(legend, "id", id)?;
                }
                legend
            }
        };
        self.legend = Some(legend);
        Ok(legend)
    }

    pub fn state(&self) -> LocateState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LocateState::Active
    }

    pub fn markers(&self) -> LocationMarkers {
        self.markers
    }

    pub fn button(&self) -> Option<ElementId> {
        self.button
    }

    pub fn legend_element(&self) -> Option<ElementId> {
        self.legend
    }

    pub fn last_fix(&self) -> Option<&LocationFix> {
        self.last_fix.as_ref().map(|(fix, _)| fix)
    }

    /// Time since the last drawn fix
    pub fn last_fix_age(&self) -> Option<Duration> {
        self.last_fix.as_ref().map(|(_, at)| at.elapsed())
    }
}

/// Position lookup made once while the page loads.
///
/// The fix is shown as a plain marker with its popup open. Pressing the locate
/// button replaces the platform request, after which this lookup is over.
#[derive(Debug, Clone)]
pub struct InitialLocate {
    options: LocateOptions,
    pending: bool,
    marker: Option<LayerId>,
}

impl InitialLocate {
    pub const POPUP_TEXT: &'static str = "Your location";

    /// Single-shot variant of the button's options, capped at `config.max_zoom`
    pub fn new(config: &OnLoadLocateConfig, base: &LocateOptions) -> Self {
        Self {
            options: LocateOptions {
                watch: false,
                set_view: true,
                max_zoom: Some(config.max_zoom),
                ..base.clone()
            },
            pending: false,
            marker: None,
        }
    }

    pub fn start(
        &mut self,
        map: &mut Map,
        geolocation: &mut dyn GeolocationService,
    ) -> std::result::Result<(), LocationError> {
        map.locate(geolocation, self.options.clone())?;
        self.pending = true;
        log::debug!("locating once on load");
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Drops a marker with an open popup at the fix; `false` once the lookup is over
    pub fn on_location_found(&mut self, map: &mut Map, fix: &LocationFix) -> Result<bool> {
        if !self.pending {
            return Ok(false);
        }
        self.pending = false;

        let marker = Marker::new(fix.lat_lng).with_popup(Self::POPUP_TEXT);
        let id = map.add_layer(Box::new(marker))?;
        map.open_popup(id)?;
        self.marker = Some(id);
        log::info!("page opened at {}", fix.lat_lng);
        Ok(true)
    }

    /// Ends the lookup; `true` if the failure belonged to it
    pub fn on_location_error(&mut self) -> bool {
        std::mem::replace(&mut self.pending, false)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn options(&self) -> &LocateOptions {
        &self.options
    }

    pub fn marker(&self) -> Option<LayerId> {
        self.marker
    }
}
