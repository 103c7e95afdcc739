use std::{fmt::Display, path::PathBuf};

use thiserror::Error;

/// Tag a track must carry to become a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagField {
    Title,
    Artist,
    Year,
}

impl Display for TagField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagField::Title => write!(f, "TITLE"),
            TagField::Artist => write!(f, "ARTIST"),
            TagField::Year => write!(f, "ORIGINALDATE|DATE|YEAR"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("config error: {0}")]
    Config(String),

    #[error("{path}: missing tag {field}")]
    MissingTag { path: PathBuf, field: TagField },

    #[error("{path}: unsupported audio format")]
    UnsupportedFormat { path: PathBuf },

    #[error("{path}: failed to read tags: {reason}")]
    TagRead { path: PathBuf, reason: String },

    #[error("{path}: transcoding failed: {reason}")]
    Transcode { path: PathBuf, reason: String },

    #[error("{} track(s) failed to transcode: {}", .0.len(), join_errors(.0))]
    TranscodeBatch(Vec<DeckError>),

    #[error("{first} and {second} resolve to the same identifier {id}")]
    DuplicateTrack {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("render error: {0}")]
    Render(String),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[DeckError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
