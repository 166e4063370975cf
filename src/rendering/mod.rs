pub mod context;
pub mod dom;

pub use context::{DrawCommand, RenderContext};
pub use dom::{DomRenderer, LAYER_ID_ATTRIBUTE};
