use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// How brush strokes respond to pointer queries.
///
/// `Vertex` checks the distance to each recorded path point only. It
/// under-detects hits in the middle of long straight segments with sparse
/// points, but it is the behavior users of the tool have learned to expect,
/// so it stays the default. `Segment` measures against the interpolated
/// polyline instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrushHitMode {
    #[default]
    Vertex,
    Segment,
}

/// Inclusive containment test: a point exactly on an edge counts as inside,
/// so click-to-reveal works on boundary pixels.
pub fn rect_contains(rect: Rect, p: Pos2) -> bool {
    rect.min.x <= p.x && p.x <= rect.max.x && rect.min.y <= p.y && p.y <= rect.max.y
}

/// Test whether `p` is within `radius` of a brush path.
///
/// The radius is the *current* brush size at query time, not the size the
/// stroke was drawn with.
pub fn near_brush_path(points: &[Pos2], p: Pos2, radius: f32, mode: BrushHitMode) -> bool {
    match mode {
        BrushHitMode::Vertex => points.iter().any(|point| point.distance(p) < radius),
        BrushHitMode::Segment => {
            if points.len() < 2 {
                return points.iter().any(|point| point.distance(p) < radius);
            }
            points
                .windows(2)
                .any(|w| distance_to_segment(p, w[0], w[1]) < radius)
        }
    }
}

/// Distance from a point to a line segment.
pub fn distance_to_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}
