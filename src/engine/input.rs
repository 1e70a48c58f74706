//! Input edge extraction: keyboard, pointer and multi-touch sources mapped
//! to lane press/release edges.

use std::collections::{HashMap, HashSet};

use tracing::trace;
use winit::keyboard::KeyCode;

use crate::config::LANE_COUNT;

use super::geometry::Layout;

/// One lane edge produced by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneEdge {
    pub lane: usize,
    pub pressed: bool,
}

impl LaneEdge {
    fn press(lane: usize) -> Self {
        Self { lane, pressed: true }
    }

    fn release(lane: usize) -> Self {
        Self { lane, pressed: false }
    }
}

/// Default four-lane home-row bindings.
pub fn default_key_bindings() -> HashMap<KeyCode, usize> {
    HashMap::from([
        (KeyCode::KeyD, 0),
        (KeyCode::KeyF, 1),
        (KeyCode::KeyJ, 2),
        (KeyCode::KeyK, 3),
    ])
}

/// Turns raw input events into lane edges.
///
/// Keyboard state is tracked per physical key so OS auto-repeat never
/// produces a second press. Touches are refcounted per lane: only the first
/// touch entering a lane presses it and only the last touch leaving releases
/// it, and a touch sliding into another lane releases its old lane first.
#[derive(Debug)]
pub struct InputDispatcher {
    bindings: HashMap<KeyCode, usize>,
    keys_down: HashSet<KeyCode>,
    touch_lanes: HashMap<u64, usize>,
    lane_touches: [HashSet<u64>; LANE_COUNT],
}

impl InputDispatcher {
    pub fn new(bindings: HashMap<KeyCode, usize>) -> Self {
        Self {
            bindings,
            keys_down: HashSet::new(),
            touch_lanes: HashMap::new(),
            lane_touches: Default::default(),
        }
    }

    pub fn with_default_bindings() -> Self {
        Self::new(default_key_bindings())
    }

    /// Keyboard edge. Returns `None` for unbound keys and repeated
    /// press/release states.
    pub fn key_event(&mut self, key: KeyCode, pressed: bool) -> Option<LaneEdge> {
        let lane = *self.bindings.get(&key)?;
        if pressed {
            if !self.keys_down.insert(key) {
                return None; // auto-repeat
            }
            trace!(?key, lane, "key press");
            Some(LaneEdge::press(lane))
        } else {
            if !self.keys_down.remove(&key) {
                return None;
            }
            trace!(?key, lane, "key release");
            Some(LaneEdge::release(lane))
        }
    }

    /// Mouse press at a surface x-coordinate.
    pub fn pointer_press(&mut self, x: f32, layout: &Layout) -> Option<LaneEdge> {
        layout.lane_from_x(x).map(LaneEdge::press)
    }

    /// Mouse release at a surface x-coordinate.
    pub fn pointer_release(&mut self, x: f32, layout: &Layout) -> Option<LaneEdge> {
        layout.lane_from_x(x).map(LaneEdge::release)
    }

    /// Touch start or move. May emit up to two edges when a touch slides
    /// from one lane into another.
    pub fn touch_at(&mut self, id: u64, x: f32, layout: &Layout) -> Vec<LaneEdge> {
        let mut edges = Vec::new();
        let Some(lane) = layout.lane_from_x(x) else {
            return edges;
        };
        if let Some(&previous) = self.touch_lanes.get(&id) {
            if previous == lane {
                return edges;
            }
            if let Some(edge) = self.detach_touch(id, previous) {
                edges.push(edge);
            }
        }
        self.touch_lanes.insert(id, lane);
        self.lane_touches[lane].insert(id);
        if self.lane_touches[lane].len() == 1 {
            trace!(id, lane, "touch press");
            edges.push(LaneEdge::press(lane));
        }
        edges
    }

    /// Touch lift. Releases the lane only when this was its last touch.
    pub fn touch_end(&mut self, id: u64) -> Option<LaneEdge> {
        let lane = self.touch_lanes.remove(&id)?;
        self.detach_touch_only(id, lane)
    }

    fn detach_touch(&mut self, id: u64, lane: usize) -> Option<LaneEdge> {
        self.touch_lanes.remove(&id);
        self.detach_touch_only(id, lane)
    }

    fn detach_touch_only(&mut self, id: u64, lane: usize) -> Option<LaneEdge> {
        if !self.lane_touches[lane].remove(&id) {
            return None;
        }
        if self.lane_touches[lane].is_empty() {
            trace!(id, lane, "touch release");
            Some(LaneEdge::release(lane))
        } else {
            None
        }
    }

    /// Forgets all held sources, e.g. on pause or round stop.
    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.touch_lanes.clear();
        for touches in &mut self.lane_touches {
            touches.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> InputDispatcher {
        InputDispatcher::with_default_bindings()
    }

    fn layout() -> Layout {
        Layout::new(720.0, 1080.0).unwrap()
    }

    #[test]
    fn key_press_and_release_map_to_lanes() {
        let mut d = dispatcher();
        assert_eq!(d.key_event(KeyCode::KeyD, true), Some(LaneEdge::press(0)));
        assert_eq!(d.key_event(KeyCode::KeyK, true), Some(LaneEdge::press(3)));
        assert_eq!(d.key_event(KeyCode::KeyD, false), Some(LaneEdge::release(0)));
    }

    #[test]
    fn auto_repeat_is_suppressed() {
        let mut d = dispatcher();
        assert!(d.key_event(KeyCode::KeyF, true).is_some());
        assert!(d.key_event(KeyCode::KeyF, true).is_none());
        assert!(d.key_event(KeyCode::KeyF, true).is_none());
        assert!(d.key_event(KeyCode::KeyF, false).is_some());
        assert!(d.key_event(KeyCode::KeyF, false).is_none());
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut d = dispatcher();
        assert!(d.key_event(KeyCode::Space, true).is_none());
    }

    #[test]
    fn pointer_maps_through_layout() {
        let mut d = dispatcher();
        let l = layout();
        assert_eq!(d.pointer_press(200.0, &l), Some(LaneEdge::press(1)));
        assert_eq!(d.pointer_release(200.0, &l), Some(LaneEdge::release(1)));
        assert!(d.pointer_press(1000.0, &l).is_none());
    }

    #[test]
    fn only_first_touch_presses_a_lane() {
        let mut d = dispatcher();
        let l = layout();
        assert_eq!(d.touch_at(1, 10.0, &l), vec![LaneEdge::press(0)]);
        assert!(d.touch_at(2, 20.0, &l).is_empty());
        // First finger up: lane still engaged by the second.
        assert!(d.touch_end(1).is_none());
        assert_eq!(d.touch_end(2), Some(LaneEdge::release(0)));
    }

    #[test]
    fn touch_sliding_lanes_releases_the_old_lane() {
        let mut d = dispatcher();
        let l = layout();
        assert_eq!(d.touch_at(7, 10.0, &l), vec![LaneEdge::press(0)]);
        let edges = d.touch_at(7, 200.0, &l);
        assert_eq!(edges, vec![LaneEdge::release(0), LaneEdge::press(1)]);
        assert_eq!(d.touch_end(7), Some(LaneEdge::release(1)));
    }

    #[test]
    fn touch_move_within_lane_is_silent() {
        let mut d = dispatcher();
        let l = layout();
        assert_eq!(d.touch_at(3, 10.0, &l), vec![LaneEdge::press(0)]);
        assert!(d.touch_at(3, 100.0, &l).is_empty());
    }

    #[test]
    fn unknown_touch_end_is_ignored() {
        let mut d = dispatcher();
        assert!(d.touch_end(99).is_none());
    }

    #[test]
    fn clear_forgets_held_sources() {
        let mut d = dispatcher();
        let l = layout();
        d.key_event(KeyCode::KeyD, true);
        d.touch_at(1, 10.0, &l);
        d.clear();
        // A fresh press works again after clear.
        assert_eq!(d.key_event(KeyCode::KeyD, true), Some(LaneEdge::press(0)));
        assert_eq!(d.touch_at(1, 10.0, &l), vec![LaneEdge::press(0)]);
    }
}
