use egui::{Color32, ColorImage, Pos2, Rect, pos2, vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::command::{Command, CommandError, CommandHistory, CommandResult};
use crate::mask::{Mask, MaskShape};
use crate::page::Page;

/// The set of open pages plus the page-scoped command history.
///
/// Exactly one page is current at a time. The history belongs to the current
/// page and is discarded, not paused, whenever the current page changes:
/// page switch, page deletion, and project load all clear it.
pub struct Project {
    pages: Vec<Page>,
    current: Option<usize>,
    history: CommandHistory,
}

impl Project {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: None,
            history: CommandHistory::new(),
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current.and_then(|i| self.pages.get(i))
    }

    pub fn current_page_mut(&mut self) -> Option<&mut Page> {
        self.current.and_then(|i| self.pages.get_mut(i))
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Split borrow for callers that feed the controller, which needs the
    /// current page and its history at the same time.
    pub fn page_and_history_mut(&mut self) -> Option<(&mut Page, &mut CommandHistory)> {
        let index = self.current?;
        Some((&mut self.pages[index], &mut self.history))
    }

    /// Append a page; the first page added becomes current.
    pub fn add_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        if self.current.is_none() {
            self.current = Some(0);
        }
        self.pages.len() - 1
    }

    /// Make another page current, discarding the edit history.
    pub fn select_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.current = Some(index);
        self.history.clear();
        true
    }

    /// Remove a page, discarding the edit history. The current page is
    /// re-pointed at the nearest surviving neighbor.
    pub fn delete_page(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.pages.remove(index);
        self.history.clear();

        self.current = if self.pages.is_empty() {
            None
        } else {
            match self.current {
                Some(cur) if cur > index => Some(cur - 1),
                Some(cur) => Some(cur.min(self.pages.len() - 1)),
                None => None,
            }
        };
        true
    }

    /// Replace all pages (project load). History is cleared and the first
    /// page, if any, becomes current.
    pub fn load_pages(&mut self, pages: Vec<Page>) {
        self.pages = pages;
        self.current = if self.pages.is_empty() { None } else { Some(0) };
        self.history.clear();
    }

    // ----- command routing for the current page -----

    pub fn execute(&mut self, command: Command) -> CommandResult {
        let index = self.current.ok_or(CommandError::NoCurrentPage)?;
        self.history.execute(command, &mut self.pages[index])
    }

    pub fn undo(&mut self) -> bool {
        match self.current {
            Some(index) => self.history.undo(&mut self.pages[index]),
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.current {
            Some(index) => self.history.redo(&mut self.pages[index]),
            None => false,
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

// ----- persistence boundary -----
//
// The persistence collaborator serializes and stores these records; the core
// only converts to and from them. Image pixels travel separately through the
// image provider, so a page is rebuilt from a record plus a decoded image.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: Uuid,
    pub name: String,
    pub masks: Vec<MaskRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskRecord {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        visible: bool,
        color: [u8; 4],
    },
    Brush {
        path: Vec<(f32, f32)>,
        visible: bool,
        color: [u8; 4],
    },
}

impl MaskRecord {
    pub fn from_mask(mask: &Mask) -> Self {
        let color = mask.color().to_array();
        match mask.shape() {
            MaskShape::Rect(rect) => MaskRecord::Rect {
                x: rect.min.x,
                y: rect.min.y,
                w: rect.width(),
                h: rect.height(),
                visible: mask.is_visible(),
                color,
            },
            MaskShape::Brush(points) => MaskRecord::Brush {
                path: points.iter().map(|p| (p.x, p.y)).collect(),
                visible: mask.is_visible(),
                color,
            },
        }
    }

    /// Rebuild a mask from its stored shape. In-memory identity is
    /// process-scoped, so the mask gets a fresh id.
    pub fn into_mask(self) -> Mask {
        match self {
            MaskRecord::Rect {
                x,
                y,
                w,
                h,
                visible,
                color,
            } => {
                let mut mask = Mask::rect(
                    Rect::from_min_size(pos2(x, y), vec2(w, h)),
                    color32_from_array(color),
                );
                mask.set_visible(visible);
                mask
            }
            MaskRecord::Brush {
                path,
                visible,
                color,
            } => {
                let points: Vec<Pos2> = path.iter().map(|&(x, y)| pos2(x, y)).collect();
                let mut mask = Mask::brush(points, color32_from_array(color));
                mask.set_visible(visible);
                mask
            }
        }
    }
}

fn color32_from_array(c: [u8; 4]) -> Color32 {
    Color32::from_rgba_premultiplied(c[0], c[1], c[2], c[3])
}

impl Page {
    pub fn to_record(&self) -> PageRecord {
        PageRecord {
            id: self.id(),
            name: self.name().to_owned(),
            masks: self.masks().iter().map(MaskRecord::from_mask).collect(),
        }
    }

    /// Rebuild a page from its record and the decoded image supplied by the
    /// image provider.
    pub fn from_record(record: PageRecord, image: ColorImage) -> Self {
        let mut page = Page::new(record.name, image);
        page.set_id(record.id);
        for mask_record in record.masks {
            page.append_mask(mask_record.into_mask());
        }
        page
    }
}
