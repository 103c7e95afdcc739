//! Encoding the anonymized clips.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use rayon::prelude::*;

use crate::{
    domain::track::{AnonymizedAsset, Track},
    error::DeckError,
    process::Process,
};

pub const CLIP_SECONDS: f64 = 60.0;
pub const CLIP_BITRATE: &str = "128k";

/// Where the clip starts, in seconds.
///
/// `fraction` of the way into the track, pulled back so the whole clip fits
/// before the end. Tracks shorter than a clip, or of unknown length, start
/// at zero. Rounded to milliseconds so the transcoder arguments are stable.
pub fn start_offset(duration_secs: f64, fraction: f64) -> f64 {
    if !duration_secs.is_finite() || duration_secs <= CLIP_SECONDS {
        return 0.0;
    }
    let offset = (duration_secs * fraction).clamp(0.0, duration_secs - CLIP_SECONDS);
    (offset * 1000.0).floor() / 1000.0
}

/// ffmpeg arguments for one clip: audio only, mono AAC at a fixed bitrate,
/// no tags, chapters or encoder string.
pub fn ffmpeg_args(source: &Path, output: &Path, offset_secs: f64) -> Vec<OsString> {
    let offset = format!("{offset_secs:.3}");
    let duration = format!("{CLIP_SECONDS}");

    let mut args = [
        "-nostdin", "-hide_banner", "-loglevel", "error", "-y", "-ss", offset.as_str(), "-i",
    ]
    .into_iter()
    .map(OsString::from)
    .collect::<Vec<_>>();
    args.push(source.into());
    args.extend(
        [
            "-t", duration.as_str(),
            // The audio stream and nothing else, so no cover art.
            "-map", "0:a:0",
            "-map_metadata", "-1",
            "-map_chapters", "-1",
            "-fflags", "+bitexact",
            "-flags:a", "+bitexact",
            "-ac", "1",
            "-c:a", "aac",
            "-b:a", CLIP_BITRATE,
            "-f", "mp4",
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

const PARTIAL_SUFFIX: &str = ".part";

/// Scratch file next to the final clip; only renamed into place on success.
fn partial_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{name}{PARTIAL_SUFFIX}"))
}

fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') && name.ends_with(PARTIAL_SUFFIX))
}

/// Deletes scratch files an interrupted run left in `songs_dir`, so they
/// are never published next to the clips. Returns how many were removed.
pub fn sweep_partials(songs_dir: &Path) -> Result<usize, DeckError> {
    let mut removed = 0;
    for entry in std::fs::read_dir(songs_dir)? {
        let path = entry?.path();
        if path.is_file() && is_partial(&path) {
            log::warn!("Removing unfinished clip {}", path.display());
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

pub struct Transcoder<'a> {
    process: &'a dyn Process,
    clip_start: f64,
}

impl<'a> Transcoder<'a> {
    pub fn new(process: &'a dyn Process, clip_start: f64) -> Self {
        Self {
            process,
            clip_start,
        }
    }

    pub fn transcode(&self, track: &Track, output: &Path) -> Result<(), DeckError> {
        let failed = |reason: String| DeckError::Transcode {
            path: track.path.clone(),
            reason,
        };

        let partial = partial_path(output);
        let offset = start_offset(track.duration_secs, self.clip_start);
        let args = ffmpeg_args(&track.path, &partial, offset);

        if let Err(e) = self.process.run(&args) {
            let _ = std::fs::remove_file(&partial);
            return Err(failed(e.to_string()));
        }

        match std::fs::metadata(&partial) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {}
            _ => {
                let _ = std::fs::remove_file(&partial);
                return Err(failed("transcoder produced no output".into()));
            }
        }

        std::fs::rename(&partial, output).map_err(|e| failed(e.to_string()))
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TranscodeReport {
    pub encoded: usize,
    pub cached: usize,
}

/// Encodes every clip that does not exist yet, at most `jobs` at a time.
///
/// All failures are collected and returned together; the run must not go on
/// with a card whose clip is missing.
pub fn transcode_all(
    items: &[(Track, AnonymizedAsset)],
    transcoder: &Transcoder,
    jobs: usize,
) -> Result<TranscodeReport, DeckError> {
    let pending = items
        .iter()
        .filter(|(_, asset)| {
            let cached = asset.media_path.exists();
            if cached {
                log::debug!("Cached: {}", asset.media_path.display());
            }
            !cached
        })
        .collect::<Vec<_>>();
    let cached = items.len() - pending.len();

    if pending.is_empty() {
        return Ok(TranscodeReport { encoded: 0, cached });
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| DeckError::Io(std::io::Error::other(e)))?;

    let failures = pool.install(|| {
        pending
            .par_iter()
            .filter_map(|(track, asset)| {
                log::info!(
                    "Encoding: {} -> {}.mp4",
                    track.path.display(),
                    asset.id
                );
                transcoder.transcode(track, &asset.media_path).err()
            })
            .collect::<Vec<_>>()
    });

    if !failures.is_empty() {
        for failure in &failures {
            log::error!("{failure}");
        }
        return Err(DeckError::TranscodeBatch(failures));
    }

    Ok(TranscodeReport {
        encoded: pending.len(),
        cached,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        ffi::OsString,
        path::{Path, PathBuf},
        sync::Mutex,
    };

    use tempfile::TempDir;

    use super::*;
    use crate::{domain::hash::ContentHash, process::ProcessError};

    /// Writes a fake clip to the last argument and remembers the input file.
    #[derive(Default)]
    pub(crate) struct FakeFfmpeg {
        pub calls: Mutex<Vec<PathBuf>>,
        pub fail_on: Option<String>,
        pub write_nothing: bool,
    }

    impl Process for FakeFfmpeg {
        fn run(&self, args: &[OsString]) -> Result<(), ProcessError> {
            let input_at = args.iter().position(|a| a == "-i").unwrap() + 1;
            let input = PathBuf::from(&args[input_at]);
            let output = PathBuf::from(args.last().unwrap());
            self.calls.lock().unwrap().push(input.clone());

            if let Some(fail) = &self.fail_on
                && input.to_string_lossy().contains(fail.as_str())
            {
                std::fs::write(&output, b"half a clip").unwrap();
                return Err(ProcessError::Failed {
                    program: "ffmpeg".into(),
                    status: "exit status: 1".into(),
                    stderr: "Invalid data found when processing input".into(),
                });
            }
            if !self.write_nothing {
                std::fs::write(&output, b"mp4 clip").unwrap();
            }
            Ok(())
        }
    }

    fn track(path: &Path, duration_secs: f64) -> Track {
        Track {
            path: path.to_path_buf(),
            title: path.to_string_lossy().into_owned(),
            artist: "Artist".into(),
            year: 1990,
            duration_secs,
            content: ContentHash::from_bytes(path.as_os_str().as_encoded_bytes()),
        }
    }

    fn items(songs_dir: &Path, names: &[&str]) -> Vec<(Track, AnonymizedAsset)> {
        names
            .iter()
            .map(|name| {
                let t = track(Path::new(name), 240.0);
                let a = AnonymizedAsset::new(&t, songs_dir, "https://example.com/");
                (t, a)
            })
            .collect()
    }

    #[test]
    fn offset_is_fraction_clamped_to_fit_clip() {
        assert_eq!(start_offset(240.0, 0.0), 0.0);
        assert_eq!(start_offset(240.0, 0.25), 60.0);
        assert_eq!(start_offset(240.0, 0.9), 180.0);
        assert_eq!(start_offset(45.0, 0.5), 0.0);
        assert_eq!(start_offset(0.0, 0.5), 0.0);
        assert_eq!(start_offset(f64::NAN, 0.5), 0.0);
    }

    #[test]
    fn args_strip_metadata_and_fix_format() {
        let args = ffmpeg_args(Path::new("in.flac"), Path::new("out.part"), 12.5);
        let args = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        let after = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };

        assert_eq!(after("-ss"), "12.500");
        assert_eq!(after("-i"), "in.flac");
        assert_eq!(after("-t"), "60");
        assert_eq!(after("-map_metadata"), "-1");
        assert_eq!(after("-ac"), "1");
        assert_eq!(after("-b:a"), "128k");
        assert_eq!(after("-c:a"), "aac");
        assert_eq!(args.last().unwrap(), "out.part");
    }

    #[test]
    fn sweep_removes_only_scratch_files() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let clip = tmp.path().join("abc.mp4");
        std::fs::write(&clip, b"mp4 clip")?;
        std::fs::write(partial_path(&tmp.path().join("def.mp4")), b"half a clip")?;
        std::fs::write(tmp.path().join("notes.part"), b"not ours")?;

        assert_eq!(sweep_partials(tmp.path())?, 1);
        assert_eq!(sweep_partials(tmp.path())?, 0);

        let mut left = std::fs::read_dir(tmp.path())?
            .map(|e| Ok(e?.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<Vec<_>>>()?;
        left.sort();
        assert_eq!(left, ["abc.mp4", "notes.part"]);
        Ok(())
    }

    #[test]
    fn transcode_writes_clip_atomically() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let ffmpeg = FakeFfmpeg::default();
        let transcoder = Transcoder::new(&ffmpeg, 0.0);
        let output = tmp.path().join("abc.mp4");

        transcoder.transcode(&track(Path::new("a.mp3"), 200.0), &output)?;

        assert_eq!(std::fs::read(&output)?, b"mp4 clip");
        assert!(!partial_path(&output).exists());
        Ok(())
    }

    #[test]
    fn failed_transcode_leaves_no_clip() {
        let tmp = TempDir::new().unwrap();
        let ffmpeg = FakeFfmpeg {
            fail_on: Some("broken".into()),
            ..Default::default()
        };
        let transcoder = Transcoder::new(&ffmpeg, 0.0);
        let output = tmp.path().join("abc.mp4");

        let err = transcoder
            .transcode(&track(Path::new("broken.mp3"), 200.0), &output)
            .unwrap_err();

        assert!(matches!(
            err,
            DeckError::Transcode { ref path, .. } if path == Path::new("broken.mp3")
        ));
        assert!(!output.exists());
        assert!(!partial_path(&output).exists());
    }

    #[test]
    fn missing_output_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let ffmpeg = FakeFfmpeg {
            write_nothing: true,
            ..Default::default()
        };
        let transcoder = Transcoder::new(&ffmpeg, 0.0);
        let err = transcoder
            .transcode(&track(Path::new("a.mp3"), 200.0), &tmp.path().join("x.mp4"))
            .unwrap_err();
        assert!(err.to_string().contains("no output"));
    }

    #[test]
    fn transcode_all_skips_existing_clips() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let items = items(tmp.path(), &["a.mp3", "b.mp3", "c.mp3"]);
        std::fs::write(&items[1].1.media_path, b"old clip")?;

        let ffmpeg = FakeFfmpeg::default();
        let report = transcode_all(&items, &Transcoder::new(&ffmpeg, 0.0), 2)?;

        assert_eq!(report, TranscodeReport { encoded: 2, cached: 1 });
        let mut calls = ffmpeg.calls.lock().unwrap().clone();
        calls.sort();
        assert_eq!(calls, vec![PathBuf::from("a.mp3"), PathBuf::from("c.mp3")]);
        assert_eq!(std::fs::read(&items[1].1.media_path)?, b"old clip");
        Ok(())
    }

    #[test]
    fn transcode_all_collects_every_failure() {
        let tmp = TempDir::new().unwrap();
        let items = items(tmp.path(), &["ok.mp3", "broken1.mp3", "broken2.mp3"]);
        let ffmpeg = FakeFfmpeg {
            fail_on: Some("broken".into()),
            ..Default::default()
        };

        let err = transcode_all(&items, &Transcoder::new(&ffmpeg, 0.0), 3).unwrap_err();

        match err {
            DeckError::TranscodeBatch(failures) => assert_eq!(failures.len(), 2),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(items[0].1.media_path.exists());
        assert!(!items[1].1.media_path.exists());
        assert!(!items[2].1.media_path.exists());
    }
}
