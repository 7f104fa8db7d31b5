use egui::{ColorImage, Context, Pos2, TextureHandle};
use uuid::Uuid;

use crate::mask::{Mask, MaskId};
use crate::settings::Settings;

pub type PageId = Uuid;

/// A decoded page image with fixed dimensions, plus a lazily created GPU
/// texture for display. The core never resizes or re-decodes it; the image
/// provider hands it over already decoded.
#[derive(Clone)]
pub struct PageImage {
    image: ColorImage,
    texture: Option<TextureHandle>,
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("size", &self.image.size)
            .field("has_texture", &self.texture.is_some())
            .finish()
    }
}

impl PageImage {
    pub fn new(image: ColorImage) -> Self {
        Self {
            image,
            texture: None,
        }
    }

    pub fn width(&self) -> f32 {
        self.image.size[0] as f32
    }

    pub fn height(&self) -> f32 {
        self.image.size[1] as f32
    }

    pub fn data(&self) -> &ColorImage {
        &self.image
    }

    /// Upload the image on first use and reuse the handle afterwards.
    pub fn texture(&mut self, ctx: &Context, name: &str) -> &TextureHandle {
        self.texture.get_or_insert_with(|| {
            ctx.load_texture(
                name.to_owned(),
                self.image.clone(),
                egui::TextureOptions::default(),
            )
        })
    }
}

/// One annotated image: a decoded image plus its ordered mask sequence.
///
/// Insertion order is the render/z-order; index 0 is the bottom. The command
/// layer drives `append`/`remove_by_id`/`insert_at`/`snapshot`/`restore`;
/// the visibility toggles and the eraser mutate directly and are deliberately
/// excluded from undo/redo.
#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    name: String,
    image: PageImage,
    masks: Vec<Mask>,
}

impl Page {
    pub fn new(name: impl Into<String>, image: ColorImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            image: PageImage::new(image),
            masks: Vec::new(),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// Keep a persisted identity when rebuilding from a record.
    pub(crate) fn set_id(&mut self, id: PageId) {
        self.id = id;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> &PageImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut PageImage {
        &mut self.image
    }

    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    pub fn mask_count(&self) -> usize {
        self.masks.len()
    }

    pub fn find_mask(&self, id: MaskId) -> Option<&Mask> {
        self.masks.iter().find(|m| m.id() == id)
    }

    pub fn find_mask_mut(&mut self, id: MaskId) -> Option<&mut Mask> {
        self.masks.iter_mut().find(|m| m.id() == id)
    }

    // ----- mask-model operations consumed by the command layer -----

    pub fn append_mask(&mut self, mask: Mask) {
        self.masks.push(mask);
    }

    /// Remove a mask by identity, returning its original index and the mask
    /// itself so an undo can re-insert it exactly where it was.
    pub fn remove_mask_by_id(&mut self, id: MaskId) -> Option<(usize, Mask)> {
        let index = self.masks.iter().position(|m| m.id() == id)?;
        Some((index, self.masks.remove(index)))
    }

    pub fn insert_mask_at(&mut self, index: usize, mask: Mask) {
        let index = index.min(self.masks.len());
        self.masks.insert(index, mask);
    }

    pub fn snapshot_masks(&self) -> Vec<Mask> {
        self.masks.clone()
    }

    pub fn clear_masks(&mut self) {
        self.masks.clear();
    }

    pub fn restore_masks(&mut self, snapshot: Vec<Mask>) {
        self.masks = snapshot;
    }

    // ----- direct mutations, deliberately outside the command history -----

    /// View-mode click: scan from topmost (last) to bottom and invert the
    /// visibility of the first mask the point hits. At most one mask toggles
    /// per click regardless of overlap. Not undoable by design.
    pub fn toggle_mask_at(&mut self, p: Pos2, settings: &Settings) -> Option<MaskId> {
        for mask in self.masks.iter_mut().rev() {
            if mask.hit_test(p, settings.brush_size, settings.brush_hit_mode) {
                mask.toggle_visible();
                log::debug!(
                    "toggled {} -> visible={}",
                    mask.id(),
                    mask.is_visible()
                );
                return Some(mask.id());
            }
        }
        None
    }

    /// Eraser pass: remove every mask the pointer circle hits, immediately.
    /// Called once per pointer event while erasing; not undoable by design.
    pub fn erase_at(&mut self, p: Pos2, settings: &Settings) -> usize {
        let before = self.masks.len();
        self.masks
            .retain(|m| !m.hit_test(p, settings.brush_size, settings.brush_hit_mode));
        before - self.masks.len()
    }

    /// Bulk show/hide used by quiz mode. Not undoable by design.
    pub fn set_all_visible(&mut self, visible: bool) {
        for mask in &mut self.masks {
            mask.set_visible(visible);
        }
    }

    /// Show everything if all masks are hidden, otherwise hide everything.
    /// Returns the new visibility. Not undoable by design.
    pub fn toggle_all_masks(&mut self) -> bool {
        let all_hidden = self.masks.iter().all(|m| !m.is_visible());
        self.set_all_visible(all_hidden);
        all_hidden
    }
}
