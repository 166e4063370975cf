//! Shared trait abstractions for layers placed on the map surface.

use crate::core::geo::LatLngBounds;

/// Operations every layer on the map surface supports.
///
/// Layers only hold state. [`crate::rendering::RenderContext::from_map`] turns
/// them into draw commands after downcasting through [`LayerOperations::as_any`].
pub trait LayerOperations: Send + Sync {
    fn name(&self) -> &str;
    fn layer_type(&self) -> crate::layers::base::LayerType;

    fn is_visible(&self) -> bool;
    fn set_visible(&mut self, visible: bool);

    /// Clamped to `0.0..=1.0` on write.
    fn opacity(&self) -> f32;
    fn set_opacity(&mut self, opacity: f32);

    /// Higher values draw above lower ones.
    fn z_index(&self) -> i32;
    fn set_z_index(&mut self, z_index: i32);

    /// Extra CSS class put on the drawn element.
    fn class_name(&self) -> Option<&str>;

    /// Geographic extent; `None` for layers that cover the whole world.
    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }

    /// Serializable snapshot of the layer's settings, used in trace logs.
    fn options(&self) -> serde_json::Value;

    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}
