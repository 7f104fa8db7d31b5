use super::{Command, CommandResult};
use crate::page::Page;

pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Bounded linear history of executed commands with undo/redo semantics.
///
/// `cursor` counts the applied commands, so `history[cursor - 1]` is the most
/// recently applied one. Executing a new command while redo entries exist
/// truncates them first; redo history is never kept past a fresh edit. The
/// history is scoped to the current page and cleared whenever the current
/// page changes.
pub struct CommandHistory {
    history: Vec<Command>,
    cursor: usize,
    max_history: usize,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_HISTORY)
    }

    pub fn with_capacity(max_history: usize) -> Self {
        assert!(max_history > 0, "history capacity must be positive");
        Self {
            history: Vec::new(),
            cursor: 0,
            max_history,
        }
    }

    /// Execute a command against the page and record it.
    pub fn execute(&mut self, mut command: Command, page: &mut Page) -> CommandResult {
        command.execute(page)?;

        // Drop the redo branch, then append.
        self.history.truncate(self.cursor);
        self.history.push(command);

        if self.history.len() > self.max_history {
            // Evicting the oldest entry shifts every surviving index down by
            // one, so the unchanged cursor keeps pointing at the command that
            // was just pushed.
            self.history.remove(0);
        } else {
            self.cursor += 1;
        }

        Ok(())
    }

    /// Undo the most recently applied command. Returns `false` (and does
    /// nothing) when the history is exhausted.
    pub fn undo(&mut self, page: &mut Page) -> bool {
        if !self.can_undo() {
            return false;
        }

        if let Err(err) = self.history[self.cursor - 1].undo(page) {
            log::warn!("undo failed: {err}");
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Re-apply the most recently undone command. Returns `false` when there
    /// is nothing to redo.
    pub fn redo(&mut self, page: &mut Page) -> bool {
        if !self.can_redo() {
            return false;
        }

        if let Err(err) = self.history[self.cursor].execute(page) {
            log::warn!("redo failed: {err}");
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    /// Reset to an empty history. Called on page switch, page deletion, and
    /// project load.
    pub fn clear(&mut self) {
        self.history.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new()
    }
}
