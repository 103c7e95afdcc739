use std::{fmt::Display, path::Path};

use crate::domain::track::Track;

/// Context string for blake3 key derivation; changing it changes every id.
const ASSET_ID_CONTEXT: &str = "hitsdeck 2024 anonymized asset id v1";

/// Bytes of the blake3 output kept in the identifier (128 bits).
pub const ASSET_ID_BYTES: usize = 16;

/// Length of the identifier as printed.
pub const ASSET_ID_LEN: usize = ASSET_ID_BYTES * 2;

/// Anonymized identifier of a track.
///
/// Used as the clip's file name and as the last path segment of the url
/// printed on the card. It is derived from the audio file's content hash
/// together with the resolved tags, never from the file's location, so
/// renaming files or adding other tracks leaves it unchanged. Since the
/// content hash is part of the input, knowing title, artist and year is not
/// enough to guess it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId([u8; ASSET_ID_BYTES]);

/// blake3 hash of a file's bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHash(pub blake3::Hash);

impl ContentHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let mut hasher = blake3::Hasher::new();
        hasher.update_reader(std::fs::File::open(path)?)?;
        Ok(Self(hasher.finalize()))
    }
}

impl AssetId {
    pub fn derive(track: &Track) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(ASSET_ID_CONTEXT);
        hasher.update(track.content.0.as_bytes());
        // Length-prefix the strings so field boundaries can't be shifted.
        for field in [track.title.as_str(), track.artist.as_str()] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(&track.year.to_le_bytes());

        let mut bytes = [0u8; ASSET_ID_BYTES];
        bytes.copy_from_slice(&hasher.finalize().as_bytes()[..ASSET_ID_BYTES]);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
