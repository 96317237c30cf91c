//! Errors surfaced to the user as warning or error dialogs.
//!
//! Every handler in [`crate::session::Session`] returns `Result<_, TrimError>`;
//! the UI decides how loud to be from [`TrimError::severity`].

use std::path::PathBuf;

/// How a [`TrimError`] is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A precondition the user can fix (nothing selected, no policy, ...).
    Warning,
    /// Reading or writing an image failed.
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum TrimError {
    #[error("Failed to load image {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No image is loaded")]
    NoImage,

    #[error("Select at least one region to crop")]
    EmptySelection,

    #[error("Select an entry to delete")]
    NoEntrySelected,

    #[error("There is no entry {index}, the history holds {len}")]
    EntryOutOfRange { index: usize, len: usize },

    #[error("There are no crops to save")]
    EmptyHistory,

    #[error("Set a target width and height or a scale factor first")]
    MissingPolicy,

    #[error("Invalid resize setting: {0}")]
    InvalidPolicy(String),

    #[error("{name} would be resized to {width}x{height} pixels")]
    EmptyOutput { name: String, width: u64, height: u64 },

    #[error("{name} would be resized to {width}x{height} pixels, which is too large")]
    OutputTooLarge { name: String, width: u64, height: u64 },

    #[error("Failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl TrimError {
    pub fn severity(&self) -> Severity {
        match self {
            TrimError::Load { .. }
            | TrimError::EmptyOutput { .. }
            | TrimError::OutputTooLarge { .. }
            | TrimError::Save { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}
