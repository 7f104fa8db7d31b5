use egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, TextureHandle, pos2, vec2};

use crate::geometry::CanvasTransform;
use crate::mask::MaskShape;
use crate::page::Page;
use crate::settings::Settings;
use crate::tools::Preview;

/// Stateless compositor: base image first, then visible masks in ascending
/// insertion order (later masks on top), then any live in-progress geometry
/// as a transient overlay. Output is fully determined by (image, mask
/// sequence, settings, transform).
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        painter: &Painter,
        texture: &TextureHandle,
        page: &Page,
        settings: &Settings,
        preview: Option<Preview<'_>>,
        xf: &CanvasTransform,
    ) {
        let image_rect = Rect::from_min_size(
            Pos2::ZERO,
            vec2(page.image().width(), page.image().height()),
        );
        painter.image(
            texture.id(),
            xf.rect_to_display(image_rect),
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            Color32::WHITE,
        );

        for mask in page.masks() {
            if !mask.is_visible() {
                continue;
            }
            match mask.shape() {
                MaskShape::Rect(rect) => {
                    painter.rect_filled(xf.rect_to_display(*rect), 0.0, mask.color());
                }
                MaskShape::Brush(points) => {
                    self.draw_path(painter, points, mask.color(), settings, xf);
                }
            }
        }

        match preview {
            Some(Preview::Rect(rect)) => {
                // Lower opacity so the user can see what the rect will cover.
                let c = settings.brush_color;
                let preview_color = Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), 179);
                painter.rect_filled(xf.rect_to_display(rect), 0.0, preview_color);
            }
            Some(Preview::Path(points)) => {
                self.draw_path(painter, points, settings.brush_color, settings, xf);
            }
            None => {}
        }
    }

    /// Brush strokes use the current global brush size as line width, the
    /// same query-time policy hit-testing follows.
    fn draw_path(
        &self,
        painter: &Painter,
        points: &[Pos2],
        color: Color32,
        settings: &Settings,
        xf: &CanvasTransform,
    ) {
        if points.len() < 2 {
            return;
        }
        let display_points: Vec<Pos2> = points.iter().map(|&p| xf.to_display(p)).collect();
        painter.add(Shape::line(
            display_points,
            Stroke::new(xf.len_to_display(settings.brush_size), color),
        ));
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
