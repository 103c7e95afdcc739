use std::path::{Path, PathBuf};

use super::hash::{AssetId, ContentHash};

/// A music track with all the tags a card needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: String,
    pub year: u32,
    /// Zero when the container does not report a length.
    pub duration_secs: f64,
    pub content: ContentHash,
}

impl Track {
    pub fn decade(&self) -> u32 {
        self.year - self.year % 10
    }
}

/// The published clip of a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymizedAsset {
    pub id: AssetId,
    pub media_path: PathBuf,
    pub url: String,
}

impl AnonymizedAsset {
    pub fn new(track: &Track, songs_dir: &Path, url_prefix: &str) -> Self {
        let id = AssetId::derive(track);
        let file_name = format!("{id}.mp4");
        Self {
            media_path: songs_dir.join(&file_name),
            url: format!("{url_prefix}{file_name}"),
            id,
        }
    }
}
