pub mod gestures;

pub use gestures::PinchTracker;

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandHistory, CommandResult};
use crate::mask::Mask;
use crate::page::Page;
use crate::settings::{self, Settings};

/// The active tool, selected by the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolMode {
    #[default]
    View,
    Rect,
    Brush,
    Eraser,
}

impl ToolMode {
    pub fn name(self) -> &'static str {
        match self {
            ToolMode::View => "View",
            ToolMode::Rect => "Rectangle",
            ToolMode::Brush => "Brush",
            ToolMode::Eraser => "Eraser",
        }
    }
}

/// In-progress geometry for preview rendering. Never written into the model
/// until commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview<'a> {
    Rect(Rect),
    Path(&'a [Pos2]),
}

#[derive(Debug, Clone)]
enum DrawState {
    Idle,
    DrawingRect { start: Pos2, current: Pos2 },
    DrawingBrush { path: Vec<Pos2> },
    Erasing,
}

/// Translates pointer events (already transformed into image-pixel space)
/// into live geometry and, on commit, into commands.
///
/// Rect and brush commits go through the command history; eraser passes and
/// view-mode visibility toggles mutate the page directly and are deliberately
/// not undoable.
pub struct DrawingController {
    mode: ToolMode,
    state: DrawState,
    pinch: PinchTracker,
}

impl DrawingController {
    pub fn new() -> Self {
        Self {
            mode: ToolMode::default(),
            state: DrawState::Idle,
            pinch: PinchTracker::new(),
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Switching tools cancels any in-progress gesture.
    pub fn set_mode(&mut self, mode: ToolMode) {
        if self.mode != mode {
            self.mode = mode;
            self.state = DrawState::Idle;
        }
    }

    pub fn is_drawing(&self) -> bool {
        !matches!(self.state, DrawState::Idle)
    }

    /// The live rectangle or path being drawn, if any.
    pub fn preview(&self) -> Option<Preview<'_>> {
        match &self.state {
            DrawState::DrawingRect { start, current } => {
                Some(Preview::Rect(Rect::from_two_pos(*start, *current)))
            }
            DrawState::DrawingBrush { path } => Some(Preview::Path(path)),
            _ => None,
        }
    }

    /// Pointer pressed at `pos` (image-pixel space).
    pub fn pointer_down(&mut self, pos: Pos2, page: &mut Page, settings: &Settings) {
        if self.pinch.is_active() {
            return;
        }

        match self.mode {
            ToolMode::View => {
                page.toggle_mask_at(pos, settings);
            }
            ToolMode::Rect => {
                self.state = DrawState::DrawingRect {
                    start: pos,
                    current: pos,
                };
            }
            ToolMode::Brush => {
                self.state = DrawState::DrawingBrush { path: vec![pos] };
            }
            ToolMode::Eraser => {
                // No discrete commit step; every pass deletes immediately.
                page.erase_at(pos, settings);
                self.state = DrawState::Erasing;
            }
        }
    }

    /// Pointer moved to `pos` while held down.
    pub fn pointer_move(&mut self, pos: Pos2, page: &mut Page, settings: &Settings) {
        if self.pinch.is_active() {
            return;
        }

        match &mut self.state {
            DrawState::Idle => {}
            DrawState::DrawingRect { current, .. } => *current = pos,
            DrawState::DrawingBrush { path } => path.push(pos),
            DrawState::Erasing => {
                page.erase_at(pos, settings);
            }
        }
    }

    /// Pointer released at `pos`: commit the gesture if it is large enough,
    /// otherwise discard it silently.
    pub fn pointer_up(
        &mut self,
        pos: Pos2,
        page: &mut Page,
        history: &mut CommandHistory,
        settings: &Settings,
    ) -> CommandResult {
        let state = std::mem::replace(&mut self.state, DrawState::Idle);

        match state {
            DrawState::Idle | DrawState::Erasing => Ok(()),

            DrawState::DrawingRect { start, .. } => {
                let rect = Rect::from_two_pos(start, pos);
                if rect.width() > settings::MIN_MASK_SIZE && rect.height() > settings::MIN_MASK_SIZE
                {
                    let mask = Mask::rect(rect, settings.brush_color);
                    log::debug!("committing rect {} ({:?})", mask.id(), rect);
                    history.execute(Command::add_mask(mask), page)
                } else {
                    // Accidental click; no mask produced.
                    log::debug!("discarding rect below minimum size: {rect:?}");
                    Ok(())
                }
            }

            DrawState::DrawingBrush { path } => {
                if path.len() > 1 {
                    let point_count = path.len();
                    let mask = Mask::brush(path, settings.brush_color);
                    log::debug!("committing brush {} ({point_count} points)", mask.id());
                    history.execute(Command::add_mask(mask), page)
                } else {
                    log::debug!("discarding single-point stroke");
                    Ok(())
                }
            }
        }
    }

    /// Feed the current set of active touch positions.
    ///
    /// Two touches form a pinch: any in-progress single-pointer gesture is
    /// cancelled, drawing stays suppressed for the duration, and the returned
    /// value is the new zoom factor when it changes. Fewer than two touches
    /// end the pinch.
    pub fn touch_update(&mut self, touches: &[Pos2], current_zoom: f32) -> Option<f32> {
        if touches.len() == 2 {
            if self.pinch.is_active() {
                self.pinch.update(touches[0], touches[1])
            } else {
                self.state = DrawState::Idle;
                self.pinch.begin(touches[0], touches[1], current_zoom);
                None
            }
        } else {
            self.pinch.end();
            None
        }
    }
}

impl Default for DrawingController {
    fn default() -> Self {
        Self::new()
    }
}
