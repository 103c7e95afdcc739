//! Turning the tracks directory into resolved tracks.

pub mod scan;
pub mod tags;

pub use scan::scan_tracks_dir;
pub use tags::{LoftyTags, TagSource, resolve_track};
