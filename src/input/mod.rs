pub mod drag;
pub mod events;
pub mod handler;

// Re-export the essential types
pub use drag::DragTracker;
pub use events::{AppEvent, MapEvent};
pub use handler::EventManager;
