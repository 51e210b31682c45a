//! Two-finger pinch handling for the editor surface.
//!
//! `TouchTracker` folds raw egui touch events into the set of currently
//! down touch points. `PinchSession` is the pure transform model: it
//! records the state at gesture start and derives scale/position updates
//! that keep the image's visual center fixed.

use std::collections::BTreeMap;

use egui::{Event, Pos2, TouchPhase, Vec2};

use super::element::MIN_SCALE;

/// Currently active touch points, keyed by platform touch id
#[derive(Debug, Default)]
pub struct TouchTracker {
    points: BTreeMap<u64, Pos2>,
}

/// Summary of a two-finger contact
#[derive(Debug, Clone, Copy)]
pub struct TwoFingerTouch {
    /// Distance between the two fingers
    pub distance: f32,
    /// Midpoint between the two fingers
    pub center: Pos2,
}

impl TouchTracker {
    /// Fold this frame's events into the tracked touch set.
    pub fn update(&mut self, events: &[Event]) {
        for event in events {
            if let Event::Touch { id, phase, pos, .. } = event {
                match phase {
                    TouchPhase::Start | TouchPhase::Move => {
                        self.points.insert(id.0, *pos);
                    }
                    TouchPhase::End | TouchPhase::Cancel => {
                        self.points.remove(&id.0);
                    }
                }
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.points.len()
    }

    /// The current two-finger contact, if exactly two touches are down.
    pub fn two_finger(&self) -> Option<TwoFingerTouch> {
        if self.points.len() != 2 {
            return None;
        }
        let mut iter = self.points.values();
        let a = *iter.next()?;
        let b = *iter.next()?;
        Some(TwoFingerTouch {
            distance: (b - a).length(),
            center: a + (b - a) / 2.0,
        })
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

/// State captured when a pinch begins on an image.
///
/// Scale follows the ratio of the current finger distance to the initial
/// one; the position is recomputed from the new scale so the recorded
/// center never drifts.
#[derive(Debug, Clone, Copy)]
pub struct PinchSession {
    start_distance: f32,
    start_scale: f32,
    center: Pos2,
}

impl PinchSession {
    pub fn begin(start_distance: f32, start_scale: f32, center: Pos2) -> Self {
        Self {
            // degenerate zero-distance touches would blow up the ratio
            start_distance: start_distance.max(1.0),
            start_scale,
            center,
        }
    }

    /// New scale for the current finger distance, floored at [`MIN_SCALE`].
    pub fn rescale(&self, distance: f32) -> f32 {
        (self.start_scale * (distance / self.start_distance)).max(MIN_SCALE)
    }

    /// Top-left position that keeps the recorded center fixed at the
    /// given scale.
    pub fn reposition(&self, base_size: Vec2, new_scale: f32) -> Pos2 {
        self.center - base_size * new_scale / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_follows_distance_ratio() {
        let session = PinchSession::begin(100.0, 2.0, Pos2::new(0.0, 0.0));
        assert!((session.rescale(150.0) - 3.0).abs() < 1e-6);
        assert!((session.rescale(50.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rescale_is_floored() {
        let session = PinchSession::begin(100.0, 1.0, Pos2::new(0.0, 0.0));
        assert_eq!(session.rescale(1.0), MIN_SCALE);
    }

    #[test]
    fn reposition_keeps_center_fixed() {
        let center = Pos2::new(300.0, 400.0);
        let session = PinchSession::begin(120.0, 1.5, center);
        let base = Vec2::new(200.0, 100.0);
        for distance in [60.0, 90.0, 120.0, 240.0, 13.0] {
            let scale = session.rescale(distance);
            let pos = session.reposition(base, scale);
            let recomputed_center = pos + base * scale / 2.0;
            assert!((recomputed_center - center).length() < 1e-3);
        }
    }
}
