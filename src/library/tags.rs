//! Resolving the tags a card needs.
//!
//! Reading tags from the containers is done by lofty; everything after that
//! (picking the date tag, extracting the year, rejecting incomplete tracks)
//! works on [`RawTags`] so it can be tested without audio files.

use std::path::Path;

use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};

use crate::{
    domain::{hash::ContentHash, track::Track},
    error::{DeckError, TagField},
    library::scan::is_music_file,
};

/// Tag values as found in the file, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub original_date: Option<String>,
    pub date: Option<String>,
    pub year: Option<String>,
    pub duration_secs: f64,
}

/// Reads the raw tags of one audio file.
pub trait TagSource: Sync {
    fn read(&self, path: &Path) -> Result<RawTags, DeckError>;
}

/// [`TagSource`] backed by lofty, covering ID3v2, Vorbis comments, MP4 atoms
/// and RIFF INFO.
pub struct LoftyTags;

fn first_string(tags: &[&Tag], key: ItemKey) -> Option<String> {
    tags.iter()
        .find_map(|tag| tag.get_string(&key))
        .map(|s| s.to_string())
}

impl TagSource for LoftyTags {
    fn read(&self, path: &Path) -> Result<RawTags, DeckError> {
        let tag_read = |reason: String| DeckError::TagRead {
            path: path.to_path_buf(),
            reason,
        };

        let tagged_file = Probe::open(path)
            .map_err(|e| tag_read(e.to_string()))?
            .read()
            .map_err(|e| tag_read(e.to_string()))?;

        // Primary tag first, so e.g. ID3v2 wins over a stale ID3v1 in an mp3.
        let mut tags = Vec::new();
        if let Some(primary) = tagged_file.primary_tag() {
            tags.push(primary);
        }
        for tag in tagged_file.tags() {
            if !tags.iter().any(|t| std::ptr::eq(*t, tag)) {
                tags.push(tag);
            }
        }

        Ok(RawTags {
            title: first_string(&tags, ItemKey::TrackTitle),
            artist: first_string(&tags, ItemKey::TrackArtist),
            original_date: first_string(&tags, ItemKey::OriginalReleaseDate),
            date: first_string(&tags, ItemKey::RecordingDate),
            year: first_string(&tags, ItemKey::Year),
            duration_secs: tagged_file.properties().duration().as_secs_f64(),
        })
    }
}

/// Returns the first run of four consecutive ASCII digits as a year.
pub fn extract_year(date: &str) -> Option<u32> {
    date.as_bytes()
        .windows(4)
        .find(|w| w.iter().all(u8::is_ascii_digit))
        .and_then(|w| std::str::from_utf8(w).ok())
        .and_then(|s| s.parse().ok())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Picks the year from ORIGINALDATE, then DATE, then YEAR.
///
/// A tag that is present but holds no four digit run does not fall through
/// to the next one; the year is reported missing instead.
pub fn resolve_year(tags: &RawTags) -> Option<u32> {
    [&tags.original_date, &tags.date, &tags.year]
        .into_iter()
        .find_map(non_empty)
        .and_then(extract_year)
}

/// Checks the required tags and builds a [`Track`] from them.
pub fn track_from_tags(
    path: &Path,
    tags: &RawTags,
    content: ContentHash,
) -> Result<Track, DeckError> {
    let missing = |field| DeckError::MissingTag {
        path: path.to_path_buf(),
        field,
    };

    let title = non_empty(&tags.title).ok_or_else(|| missing(TagField::Title))?;
    let artist = non_empty(&tags.artist).ok_or_else(|| missing(TagField::Artist))?;
    let year = resolve_year(tags).ok_or_else(|| missing(TagField::Year))?;

    Ok(Track {
        path: path.to_path_buf(),
        title: title.to_string(),
        artist: artist.to_string(),
        year,
        duration_secs: tags.duration_secs,
        content,
    })
}

/// Reads and validates one file from the tracks directory.
pub fn resolve_track(path: &Path, source: &dyn TagSource) -> Result<Track, DeckError> {
    if !is_music_file(path) {
        return Err(DeckError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }
    let tags = source.read(path)?;
    let content = ContentHash::from_file(path)?;
    track_from_tags(path, &tags, content)
}
