use crate::{
    core::{
        constants::{MARKER_ICON_ANCHOR, MARKER_ICON_SIZE, MARKER_POPUP_ANCHOR, MARKER_Z_INDEX},
        geo::{LatLng, LatLngBounds},
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
};

/// A marker icon drawn from plain HTML and styled entirely by a CSS class
#[derive(Debug, Clone, PartialEq)]
pub struct DivIcon {
    pub class_name: String,
    pub size: (u32, u32),
    /// Popup offset from the icon center
    pub popup_anchor: (i32, i32),
}

impl DivIcon {
    pub fn new(class_name: impl Into<String>, size: (u32, u32)) -> Self {
        Self {
            class_name: class_name.into(),
            size,
            popup_anchor: (0, 0),
        }
    }

    pub fn with_popup_anchor(mut self, anchor: (i32, i32)) -> Self {
        self.popup_anchor = anchor;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Icon {
    /// The stock pin image
    #[default]
    Default,
    Div(DivIcon),
}

impl Icon {
    pub fn size(&self) -> (u32, u32) {
        match self {
            Icon::Default => MARKER_ICON_SIZE,
            Icon::Div(icon) => icon.size,
        }
    }

    /// Hot-spot inside the icon that sits on the marker position
    pub fn anchor(&self) -> (u32, u32) {
        match self {
            Icon::Default => MARKER_ICON_ANCHOR,
            Icon::Div(icon) => (icon.size.0 / 2, icon.size.1 / 2),
        }
    }

    pub fn popup_anchor(&self) -> (i32, i32) {
        match self {
            Icon::Default => MARKER_POPUP_ANCHOR,
            Icon::Div(icon) => icon.popup_anchor,
        }
    }

    pub fn class_name(&self) -> &str {
        match self {
            Icon::Default => "map-marker-icon",
            Icon::Div(icon) => &icon.class_name,
        }
    }
}

pub struct Marker {
    properties: LayerProperties,
    position: LatLng,
    title: Option<String>,
    popup_text: Option<String>,
    icon: Icon,
}

impl Marker {
    pub fn new(position: LatLng) -> Self {
        let mut properties = LayerProperties::new("Marker".to_string(), LayerType::Marker);
        properties.z_index = MARKER_Z_INDEX;
        Self {
            properties,
            position,
            title: None,
            popup_text: None,
            icon: Icon::Default,
        }
    }

    /// Hover text of the marker element
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_popup(mut self, text: impl Into<String>) -> Self {
        self.popup_text = Some(text.into());
        self
    }

    /// Replaces the icon; the layer is tagged with the icon's class
    pub fn with_icon(mut self, icon: Icon) -> Self {
        self.properties.class_name = match &icon {
            Icon::Default => None,
            Icon::Div(div) => Some(div.class_name.clone()),
        };
        self.icon = icon;
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn popup(&self) -> Option<&str> {
        self.popup_text.as_deref()
    }

    pub fn icon(&self) -> &Icon {
        &self.icon
    }
}

impl LayerTrait for Marker {
    crate::impl_layer_trait!(Marker, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "position": {
                "lat": self.position.lat,
                "lng": self.position.lng
            },
            "title": self.title,
            "popup": self.popup_text,
            "icon": self.icon.class_name(),
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_marker() {
        let marker = Marker::new(LatLng::new(1.0, 2.0))
            .with_title("La Barrosa")
            .with_popup("La Barrosa");

        assert_eq!(marker.title(), Some("La Barrosa"));
        assert_eq!(marker.popup(), Some("La Barrosa"));
        assert_eq!(marker.class_name(), None);
        assert_eq!(marker.icon().anchor(), MARKER_ICON_ANCHOR);
    }

    #[test]
    fn test_div_icon_tags_layer() {
        let icon = DivIcon::new("located-animation", (17, 17)).with_popup_anchor((0, -15));
        let marker = Marker::new(LatLng::new(1.0, 2.0)).with_icon(Icon::Div(icon));

        assert_eq!(marker.class_name(), Some("located-animation"));
        assert_eq!(marker.icon().anchor(), (8, 8));
        assert_eq!(marker.icon().popup_anchor(), (0, -15));
        assert_eq!(marker.options()["icon"], "located-animation");
    }
}
