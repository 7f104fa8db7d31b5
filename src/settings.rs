use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::geometry::BrushHitMode;

pub const BRUSH_SIZE_MIN: f32 = 5.0;
pub const BRUSH_SIZE_MAX: f32 = 80.0;
pub const BRUSH_SIZE_DEFAULT: f32 = 20.0;

pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 5.0;
pub const ZOOM_STEP: f32 = 0.1;

/// Rectangles narrower or shorter than this (in image pixels) are treated as
/// accidental clicks and produce no mask.
pub const MIN_MASK_SIZE: f32 = 5.0;

/// Swatch colors offered in the side panel.
pub const PALETTE: [Color32; 6] = [
    Color32::from_rgb(0x44, 0x40, 0x3c), // stone (default)
    Color32::from_rgb(0xdc, 0x26, 0x26), // red
    Color32::from_rgb(0x25, 0x63, 0xeb), // blue
    Color32::from_rgb(0x16, 0xa3, 0x4a), // green
    Color32::from_rgb(0xd9, 0x77, 0x06), // amber
    Color32::from_rgb(0x0f, 0x0f, 0x0f), // near-black
];

/// Current brush configuration.
///
/// Mutable by the UI at any time and read by hit-testing, the eraser, and the
/// render pass at query/render time. Passed explicitly into those calls; the
/// per-mask `color` is the only value snapshotted at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub brush_color: Color32,
    pub brush_size: f32,
    pub brush_hit_mode: BrushHitMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brush_color: PALETTE[0],
            brush_size: BRUSH_SIZE_DEFAULT,
            brush_hit_mode: BrushHitMode::default(),
        }
    }
}

impl Settings {
    pub fn set_brush_size(&mut self, size: f32) {
        self.brush_size = size.clamp(BRUSH_SIZE_MIN, BRUSH_SIZE_MAX);
    }
}

pub fn clamp_zoom(zoom: f32) -> f32 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}
