use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::DeckError;
use crate::layout::{Duplex, Grid, PageGeometry, PageOrder};

pub const DEFAULT_CONFIG_FILE: &str = "mkhitsgame.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Prepended verbatim to `{id}.mp4`, so it must end with a separator.
    pub url_prefix: String,
    pub font: String,
    #[serde(default = "default_songs_dir")]
    pub songs_dir: PathBuf,
    #[serde(default = "default_tracks_dir")]
    pub tracks_dir: PathBuf,
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Outline around every card slot. Handy on screen; for print you
    /// probably want crop marks instead, so a slightly off cut does not
    /// leave a line near the card edge.
    #[serde(default = "default_true")]
    pub grid: bool,
    #[serde(default)]
    pub crop_marks: bool,

    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_cols")]
    pub cols: usize,
    #[serde(default)]
    pub duplex: Duplex,
    #[serde(default)]
    pub page_order: PageOrder,

    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Where the clip starts, as a fraction of the track length.
    #[serde(default)]
    pub clip_start: f64,
    #[serde(default)]
    pub branding: Option<String>,

    #[serde(default = "default_transcoder")]
    pub transcoder: String,
    #[serde(default = "default_renderer")]
    pub renderer: String,
}

fn default_songs_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_tracks_dir() -> PathBuf {
    PathBuf::from("tracks")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_true() -> bool {
    true
}

fn default_rows() -> usize {
    4
}

fn default_cols() -> usize {
    3
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_transcoder() -> String {
    "ffmpeg".to_string()
}

fn default_renderer() -> String {
    "rsvg-convert".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, DeckError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DeckError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Config, DeckError> {
        let cfg: Config = toml::from_str(contents)
            .map_err(|e| DeckError::Config(format!("failed to parse config TOML: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), DeckError> {
        if self.url_prefix.is_empty() {
            return Err(DeckError::Config("url_prefix must not be empty".into()));
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(DeckError::Config("rows and cols must be at least 1".into()));
        }
        if self.jobs == 0 {
            return Err(DeckError::Config("jobs must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.clip_start) {
            return Err(DeckError::Config(format!(
                "clip_start must be in [0, 1), got {}",
                self.clip_start
            )));
        }
        if !self.url_prefix.ends_with('/') {
            log::warn!(
                "url_prefix {:?} does not end with '/', urls will be glued to it verbatim",
                self.url_prefix
            );
        }
        PageGeometry::a4(self.grid()).map(|_| ())
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.rows, self.cols)
    }
}
