use egui::{Pos2, Rect, pos2};

/// Maps between display-space pointer positions and image-pixel space.
///
/// Built per pointer event from the on-screen rect the canvas occupies and
/// the canvas pixel dimensions. All pointer coordinates are converted through
/// this before they reach the drawing state machine, so the model only ever
/// sees image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    origin: Pos2,
    scale_x: f32,
    scale_y: f32,
}

impl CanvasTransform {
    /// `display_rect` is the rect the image is drawn into on screen;
    /// `canvas_width`/`canvas_height` are the image's pixel dimensions.
    pub fn new(display_rect: Rect, canvas_width: f32, canvas_height: f32) -> Self {
        Self {
            origin: display_rect.min,
            scale_x: canvas_width / display_rect.width(),
            scale_y: canvas_height / display_rect.height(),
        }
    }

    pub fn to_image(&self, display_pos: Pos2) -> Pos2 {
        pos2(
            (display_pos.x - self.origin.x) * self.scale_x,
            (display_pos.y - self.origin.y) * self.scale_y,
        )
    }

    pub fn to_display(&self, image_pos: Pos2) -> Pos2 {
        pos2(
            self.origin.x + image_pos.x / self.scale_x,
            self.origin.y + image_pos.y / self.scale_y,
        )
    }

    pub fn rect_to_display(&self, image_rect: Rect) -> Rect {
        Rect::from_min_max(
            self.to_display(image_rect.min),
            self.to_display(image_rect.max),
        )
    }

    /// Scale a length (e.g. the brush line width) from image pixels into
    /// display points, using the horizontal scale.
    pub fn len_to_display(&self, image_len: f32) -> f32 {
        image_len / self.scale_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::vec2;

    #[test]
    fn pointer_positions_are_premultiplied_into_image_space() {
        // A 1000x1000 canvas displayed at half size, offset on screen.
        let display = Rect::from_min_size(pos2(10.0, 20.0), vec2(500.0, 500.0));
        let xf = CanvasTransform::new(display, 1000.0, 1000.0);

        assert_eq!(xf.to_image(pos2(10.0, 20.0)), pos2(0.0, 0.0));
        assert_eq!(xf.to_image(pos2(510.0, 520.0)), pos2(1000.0, 1000.0));
        assert_eq!(xf.to_image(pos2(260.0, 270.0)), pos2(500.0, 500.0));
    }

    #[test]
    fn round_trips_through_display_space() {
        let display = Rect::from_min_size(pos2(5.0, 5.0), vec2(400.0, 300.0));
        let xf = CanvasTransform::new(display, 800.0, 600.0);

        let p = pos2(123.0, 456.0);
        let back = xf.to_image(xf.to_display(p));
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);

        assert!((xf.len_to_display(20.0) - 10.0).abs() < 1e-6);
    }
}
