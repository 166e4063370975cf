use crate::core::{constants::CLICK_TOLERANCE, geo::Point};

/// Turns a press-move-release sequence into pan offsets.
///
/// Movement stays a click until the pointer leaves the [`CLICK_TOLERANCE`]
/// radius around the press; the first pan then carries the whole distance
/// from the press so the map stays under the pointer.
#[derive(Debug, Default, Clone)]
pub struct DragTracker {
    start: Option<Point>,
    last: Point,
    panning: bool,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, at: Point) {
        self.start = Some(at);
        self.last = at;
        self.panning = false;
    }

    /// Offset to pan the map by, if the pointer is down and past the tolerance
    pub fn move_to(&mut self, at: Point) -> Option<Point> {
        let start = self.start?;
        if !self.panning {
            if start.distance_to(&at) <= CLICK_TOLERANCE {
                return None;
            }
            self.panning = true;
        }
        let offset = self.last - at;
        self.last = at;
        Some(offset)
    }

    pub fn release(&mut self) {
        self.start = None;
    }

    pub fn is_pressed(&self) -> bool {
        self.start.is_some()
    }

    /// Whether the last press turned into a pan; the click that follows a
    /// release is swallowed then
    pub fn dragged(&self) -> bool {
        self.panning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_stays_a_click() {
        let mut drag = DragTracker::new();
        drag.press(Point::new(100.0, 100.0));
        assert_eq!(drag.move_to(Point::new(101.0, 101.0)), None);
        assert_eq!(drag.move_to(Point::new(99.0, 100.0)), None);
        drag.release();
        assert!(!drag.dragged());
        assert!(!drag.is_pressed());
    }

    #[test]
    fn test_first_pan_covers_distance_from_press() {
        let mut drag = DragTracker::new();
        drag.press(Point::new(100.0, 100.0));
        assert_eq!(drag.move_to(Point::new(102.0, 100.0)), None);
        assert_eq!(drag.move_to(Point::new(105.0, 100.0)), Some(Point::new(-5.0, 0.0)));
        assert_eq!(drag.move_to(Point::new(105.0, 90.0)), Some(Point::new(0.0, 10.0)));
        drag.release();
        assert!(drag.dragged());

        // offsets add up to the whole pointer travel
        drag.press(Point::new(0.0, 0.0));
        let total = [Point::new(1.0, 1.0), Point::new(2.0, 2.0), Point::new(30.0, -4.0)]
            .into_iter()
            .filter_map(|at| drag.move_to(at))
            .fold(Point::default(), |sum, offset| sum + offset);
        assert_eq!(total, Point::new(-30.0, 4.0));
    }

    #[test]
    fn test_moves_without_press_do_nothing() {
        let mut drag = DragTracker::new();
        assert_eq!(drag.move_to(Point::new(50.0, 50.0)), None);
        assert!(!drag.dragged());
    }
}
