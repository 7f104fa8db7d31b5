use egui::Pos2;

use crate::settings;

/// Tracks a two-finger pinch-zoom gesture.
///
/// While a pinch is active, single-pointer drawing is suppressed; the two
/// interpretations are exclusive, never simultaneous.
#[derive(Debug, Default)]
pub struct PinchTracker {
    initial_distance: Option<f32>,
    initial_zoom: f32,
}

impl PinchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.initial_distance.is_some()
    }

    pub fn begin(&mut self, a: Pos2, b: Pos2, current_zoom: f32) {
        self.initial_distance = Some(a.distance(b).max(f32::EPSILON));
        self.initial_zoom = current_zoom;
    }

    /// Returns the new zoom factor for the current finger spread, clamped to
    /// the supported zoom range.
    pub fn update(&mut self, a: Pos2, b: Pos2) -> Option<f32> {
        let initial = self.initial_distance?;
        let scale = a.distance(b) / initial;
        Some(settings::clamp_zoom(scale * self.initial_zoom))
    }

    pub fn end(&mut self) {
        self.initial_distance = None;
    }
}
