pub mod controls;
pub mod locate;
pub mod minimap;
pub mod readout;
pub mod sidebar;

pub use controls::{Attribution, ControlEntry, ControlManager, Position, ZoomControl};

pub use locate::{LocateControl, LocateState, LocationMarkers};

pub use minimap::MiniMap;

pub use readout::ClickReadout;

pub use sidebar::{PoiSidebar, PointOfInterest, SidebarEntry};
