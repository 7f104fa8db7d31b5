use egui::{Color32, Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::geometry::hit_testing::{self, BrushHitMode};
use crate::id_generator;

/// Process-unique mask identity.
///
/// Assigned once at creation and never reused. All removal and re-insertion
/// goes through this id rather than positional or structural equality, since
/// a mask's index changes under insert/remove/undo and the same logical mask
/// may be round-tripped through persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaskId(u64);

impl MaskId {
    pub fn new() -> Self {
        Self(id_generator::generate_id())
    }
}

impl Default for MaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mask#{}", self.0)
    }
}

/// The closed set of mask geometries.
#[derive(Debug, Clone, PartialEq)]
pub enum MaskShape {
    /// Axis-aligned rectangle in image-pixel space, `w,h > 0`.
    Rect(Rect),
    /// Ordered, non-empty polyline in image-pixel space.
    Brush(Vec<Pos2>),
}

/// A single opaque occlusion element overlaid on a page image.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    id: MaskId,
    shape: MaskShape,
    visible: bool,
    color: Color32,
}

impl Mask {
    /// Create a rectangle mask. The color is snapshotted here and never
    /// retroactively affected by later palette changes.
    pub fn rect(rect: Rect, color: Color32) -> Self {
        Self {
            id: MaskId::new(),
            shape: MaskShape::Rect(rect),
            visible: true,
            color,
        }
    }

    /// Create a freehand stroke mask from an ordered sequence of points.
    pub fn brush(path: Vec<Pos2>, color: Color32) -> Self {
        Self {
            id: MaskId::new(),
            shape: MaskShape::Brush(path),
            visible: true,
            color,
        }
    }

    pub fn id(&self) -> MaskId {
        self.id
    }

    pub fn shape(&self) -> &MaskShape {
        &self.shape
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    /// Test whether a pointer position hits this mask.
    ///
    /// `brush_radius` is the current global brush size at query time; brush
    /// strokes are matched against it rather than any size recorded when the
    /// stroke was drawn.
    pub fn hit_test(&self, p: Pos2, brush_radius: f32, mode: BrushHitMode) -> bool {
        match &self.shape {
            MaskShape::Rect(rect) => hit_testing::rect_contains(*rect, p),
            MaskShape::Brush(points) => hit_testing::near_brush_path(points, p, brush_radius, mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn ids_are_unique_per_creation() {
        let a = Mask::rect(
            Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 10.0)),
            Color32::RED,
        );
        let b = a.clone();
        let c = Mask::rect(
            Rect::from_min_size(pos2(0.0, 0.0), vec2(10.0, 10.0)),
            Color32::RED,
        );

        // Clones keep identity; fresh masks get a new one.
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn masks_are_visible_at_creation() {
        let mut mask = Mask::brush(vec![pos2(1.0, 1.0)], Color32::BLACK);
        assert!(mask.is_visible());
        mask.toggle_visible();
        assert!(!mask.is_visible());
    }

    #[test]
    fn hit_test_dispatches_per_shape() {
        let rect = Mask::rect(
            Rect::from_min_size(pos2(100.0, 100.0), vec2(50.0, 50.0)),
            Color32::RED,
        );
        assert!(rect.hit_test(pos2(100.0, 100.0), 20.0, BrushHitMode::Vertex));
        assert!(!rect.hit_test(pos2(99.0, 100.0), 20.0, BrushHitMode::Vertex));

        let brush = Mask::brush(vec![pos2(10.0, 10.0), pos2(30.0, 10.0)], Color32::RED);
        assert!(brush.hit_test(pos2(12.0, 12.0), 20.0, BrushHitMode::Vertex));
        assert!(!brush.hit_test(pos2(12.0, 12.0), 1.0, BrushHitMode::Vertex));
    }
}
