mod commands;
mod history;

pub use commands::Command;
pub use history::{CommandHistory, DEFAULT_MAX_HISTORY};

use crate::mask::MaskId;

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The targeted mask is not present on the page
    #[error("{0} not found on page")]
    MaskNotFound(MaskId),
    /// Undo was attempted on a command that never executed
    #[error("command has no recorded state to undo")]
    NotExecuted,
    /// There is no current page to apply the command to
    #[error("no current page")]
    NoCurrentPage,
}
