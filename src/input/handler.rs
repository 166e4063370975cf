use crate::input::events::MapEvent;
use std::collections::VecDeque;

/// FIFO of the events the map surface raised since the last drain.
///
/// The app pulls the queue after every interaction and routes each event to
/// the control that reacts to it.
#[derive(Debug, Default)]
pub struct EventManager {
    queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: MapEvent) {
        log::trace!("queued {}", event.event_type());
        self.queue.push_back(event);
    }

    /// Empties the queue, oldest event first
    pub fn drain(&mut self) -> Vec<MapEvent> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};

    #[test]
    fn test_drain_keeps_emission_order() {
        let mut queue = EventManager::new();
        queue.emit(MapEvent::Click {
            lat_lng: LatLng::new(1.0, 2.0),
            pixel: Point::new(3.0, 4.0),
        });
        queue.emit(MapEvent::ViewChanged {
            center: LatLng::new(0.0, 0.0),
            zoom: 3.0,
        });
        assert_eq!(queue.len(), 2);

        let names: Vec<&str> = queue.drain().iter().map(MapEvent::event_type).collect();
        assert_eq!(names, ["click", "viewchanged"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_of_empty_queue() {
        let mut queue = EventManager::new();
        assert!(queue.drain().is_empty());
    }
}
