use crate::{
    core::{
        constants::OVERLAY_Z_INDEX,
        geo::{LatLng, LatLngBounds},
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
};
use serde::{Deserialize, Serialize};

/// Stroke and fill options for path layers, mirroring the CSS/SVG attributes
/// the page stylesheet understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub class_name: Option<String>,
    /// Whether to draw the outline
    pub stroke: bool,
    pub color: String,
    /// Outline width in pixels
    pub weight: f32,
    pub fill: bool,
    pub fill_color: String,
    /// Fill opacity (0.0 to 1.0)
    pub fill_opacity: f32,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            class_name: None,
            stroke: true,
            color: "#3388ff".to_string(),
            weight: 3.0,
            fill: true,
            fill_color: "#3388ff".to_string(),
            fill_opacity: 0.2,
        }
    }
}

/// A circle with a radius in meters, so it scales with the zoom level
pub struct Circle {
    properties: LayerProperties,
    center: LatLng,
    radius_m: f64,
    style: PathStyle,
}

impl Circle {
    pub fn new(center: LatLng, radius_m: f64) -> Self {
        let mut properties = LayerProperties::new("Circle".to_string(), LayerType::Circle);
        properties.z_index = OVERLAY_Z_INDEX;
        Self {
            properties,
            center,
            radius_m: radius_m.max(0.0),
            style: PathStyle::default(),
        }
    }

    pub fn with_style(mut self, style: PathStyle) -> Self {
        self.properties.class_name = style.class_name.clone();
        self.style = style;
        self
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius_m
    }

    pub fn style(&self) -> &PathStyle {
        &self.style
    }
}

impl LayerTrait for Circle {
    crate::impl_layer_trait!(Circle, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "center": { "lat": self.center.lat, "lng": self.center.lng },
            "radius": self.radius_m,
            "style": self.style,
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(self.center.to_bounds(self.radius_m * 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_style_tags_layer() {
        let style = PathStyle {
            class_name: Some("locate-circle".to_string()),
            stroke: false,
            ..Default::default()
        };
        let circle = Circle::new(LatLng::new(0.0, 0.0), 15.0).with_style(style);

        assert_eq!(circle.radius(), 15.0);
        assert_eq!(circle.class_name(), Some("locate-circle"));
        assert!(!circle.style().stroke);
        assert_eq!(circle.options()["radius"], 15.0);
    }

    #[test]
    fn test_negative_radius_is_clamped() {
        let circle = Circle::new(LatLng::new(0.0, 0.0), -4.0);
        assert_eq!(circle.radius(), 0.0);
    }

    #[test]
    fn test_circle_bounds_contain_center() {
        let circle = Circle::new(LatLng::new(10.0, 20.0), 500.0);
        let bounds = circle.bounds().unwrap();
        assert!(bounds.contains(&LatLng::new(10.0, 20.0)));
    }
}
