//! Module to scan the tracks directory

use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use crate::error::DeckError;

pub const MUSIC_EXTENSIONS: &[&str] = &["mp3", "flac", "m4a", "ogg", "wav"];

pub fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MUSIC_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Lists the regular files directly inside `root`, sorted by path.
///
/// Hidden files are skipped. Everything else is returned, including files
/// that do not look like music, so the resolver can reject them loudly
/// instead of a track silently going missing from the deck.
pub fn scan_tracks_dir(root: &Path) -> Result<Vec<PathBuf>, DeckError> {
    if !root.is_dir() {
        return Err(DeckError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("tracks directory {} not found", root.display()),
        )));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
    {
        let entry = entry.map_err(|e| {
            DeckError::Io(std::io::Error::other(format!(
                "error while scanning {}: {e}",
                root.display()
            )))
        })?;
        if !entry.file_type().is_file() || is_hidden(entry.path()) {
            continue;
        }
        paths.push(entry.into_path());
    }
    paths.sort();
    Ok(paths)
}
