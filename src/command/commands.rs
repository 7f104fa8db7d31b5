use super::{CommandError, CommandResult};
use crate::mask::{Mask, MaskId};
use crate::page::Page;

/// An atomic, reversible mutation of exactly one page's mask sequence.
///
/// Commands record whatever they need for their own undo while executing:
/// `RemoveMask` keeps the removed mask and its original index so undo can
/// re-insert it in place (re-appending would silently reorder the z-stack),
/// and `ClearMasks` snapshots the whole sequence before emptying it.
#[derive(Debug, Clone)]
pub enum Command {
    /// Append a mask to the tail of the sequence.
    AddMask { mask: Mask },

    /// Remove a mask by identity, remembering where it sat.
    RemoveMask {
        id: MaskId,
        removed: Option<(usize, Mask)>,
    },

    /// Empty the sequence after snapshotting it.
    ClearMasks { snapshot: Vec<Mask> },
}

impl Command {
    pub fn add_mask(mask: Mask) -> Self {
        Command::AddMask { mask }
    }

    pub fn remove_mask(id: MaskId) -> Self {
        Command::RemoveMask { id, removed: None }
    }

    pub fn clear_masks() -> Self {
        Command::ClearMasks {
            snapshot: Vec::new(),
        }
    }

    /// Apply the command to the page. Side effects are synchronous and
    /// visible to the caller before return. Re-executed verbatim on redo.
    pub fn execute(&mut self, page: &mut Page) -> CommandResult {
        match self {
            Command::AddMask { mask } => {
                page.append_mask(mask.clone());
                Ok(())
            }

            Command::RemoveMask { id, removed } => {
                let (index, mask) = page
                    .remove_mask_by_id(*id)
                    .ok_or(CommandError::MaskNotFound(*id))?;
                *removed = Some((index, mask));
                Ok(())
            }

            Command::ClearMasks { snapshot } => {
                *snapshot = page.snapshot_masks();
                page.clear_masks();
                Ok(())
            }
        }
    }

    /// Reverse the most recent `execute` of this command.
    pub fn undo(&mut self, page: &mut Page) -> CommandResult {
        match self {
            Command::AddMask { mask } => {
                // Take the live mask back so a later redo re-adds it with
                // whatever visibility it had, same identity included.
                let (_, removed) = page
                    .remove_mask_by_id(mask.id())
                    .ok_or(CommandError::MaskNotFound(mask.id()))?;
                *mask = removed;
                Ok(())
            }

            Command::RemoveMask { removed, .. } => {
                let (index, mask) = removed.take().ok_or(CommandError::NotExecuted)?;
                page.insert_mask_at(index, mask);
                Ok(())
            }

            Command::ClearMasks { snapshot } => {
                page.restore_masks(std::mem::take(snapshot));
                Ok(())
            }
        }
    }
}
