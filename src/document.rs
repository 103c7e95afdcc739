//! Joining the rendered pages into the printable PDF.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::{error::DeckError, process::Process};

pub const DECK_FILE: &str = "cards.pdf";

/// A rendered page and the name it is written under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub label: String,
    pub svg: String,
}

/// Arguments for rsvg-convert to concatenate `inputs` into one PDF.
pub fn renderer_args(inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut output_arg = OsString::from("--output=");
    output_arg.push(output);

    let mut args = vec![OsString::from("--format=pdf"), output_arg];
    args.extend(inputs.iter().map(|p| p.as_os_str().to_owned()));
    args
}

/// Writes every page to `build_dir/{label}.svg` and renders them, in order,
/// into `build_dir/cards.pdf`.
///
/// Returns `None` without calling the renderer when there are no pages.
pub fn assemble(
    pages: &[Page],
    build_dir: &Path,
    renderer: &dyn Process,
) -> Result<Option<PathBuf>, DeckError> {
    let output = build_dir.join(DECK_FILE);

    // A stale deck must not survive a failed or empty render.
    if output.exists() {
        std::fs::remove_file(&output)?;
    }

    if pages.is_empty() {
        log::warn!("No cards to print, not writing {}", output.display());
        return Ok(None);
    }

    let mut inputs = Vec::with_capacity(pages.len());
    for page in pages {
        let path = build_dir.join(format!("{}.svg", page.label));
        std::fs::write(&path, &page.svg)?;
        inputs.push(path);
    }

    renderer
        .run(&renderer_args(&inputs, &output))
        .map_err(|e| DeckError::Render(e.to_string()))?;

    if !output.is_file() {
        return Err(DeckError::Render(format!(
            "renderer did not produce {}",
            output.display()
        )));
    }
    log::info!("Wrote {} pages to {}", pages.len(), output.display());
    Ok(Some(output))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{ffi::OsString, path::PathBuf, sync::Mutex};

    use tempfile::TempDir;

    use super::*;
    use crate::process::ProcessError;

    /// Concatenates the input files into the `--output=` file.
    #[derive(Default)]
    pub(crate) struct FakeRsvg {
        pub inputs: Mutex<Vec<PathBuf>>,
        pub fail: bool,
    }

    impl Process for FakeRsvg {
        fn run(&self, args: &[OsString]) -> Result<(), ProcessError> {
            if self.fail {
                return Err(ProcessError::Failed {
                    program: "rsvg-convert".into(),
                    status: "exit status: 1".into(),
                    stderr: "Error reading SVG".into(),
                });
            }
            let args = args
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect::<Vec<_>>();
            let output = args
                .iter()
                .find_map(|a| a.strip_prefix("--output="))
                .unwrap();
            let inputs = args
                .iter()
                .filter(|a| !a.starts_with("--"))
                .map(PathBuf::from)
                .collect::<Vec<_>>();

            let mut pdf = Vec::new();
            for input in &inputs {
                pdf.extend(std::fs::read(input).unwrap());
            }
            std::fs::write(output, pdf).unwrap();
            self.inputs.lock().unwrap().extend(inputs);
            Ok(())
        }
    }

    fn pages(labels: &[&str]) -> Vec<Page> {
        labels
            .iter()
            .map(|l| Page {
                label: l.to_string(),
                svg: format!("<svg>{l}</svg>"),
            })
            .collect()
    }

    #[test]
    fn pages_are_rendered_in_order() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let renderer = FakeRsvg::default();

        let output = assemble(&pages(&["1a", "1b", "2a", "2b"]), tmp.path(), &renderer)?;

        let output = output.unwrap();
        assert_eq!(output, tmp.path().join("cards.pdf"));
        assert_eq!(
            std::fs::read_to_string(&output)?,
            "<svg>1a</svg><svg>1b</svg><svg>2a</svg><svg>2b</svg>"
        );
        assert_eq!(
            *renderer.inputs.lock().unwrap(),
            ["1a", "1b", "2a", "2b"]
                .iter()
                .map(|l| tmp.path().join(format!("{l}.svg")))
                .collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn no_pages_means_no_document() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let renderer = FakeRsvg::default();

        assert_eq!(assemble(&[], tmp.path(), &renderer)?, None);
        assert!(renderer.inputs.lock().unwrap().is_empty());
        Ok(())
    }

    #[test]
    fn no_pages_removes_previous_deck() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let deck = tmp.path().join("cards.pdf");
        std::fs::write(&deck, b"old deck with 40 cards")?;

        assert_eq!(assemble(&[], tmp.path(), &FakeRsvg::default())?, None);
        assert!(!deck.exists());
        Ok(())
    }

    #[test]
    fn renderer_failure_is_propagated_and_removes_stale_deck() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("cards.pdf"), b"old deck").unwrap();
        let renderer = FakeRsvg {
            fail: true,
            ..Default::default()
        };

        let err = assemble(&pages(&["1a", "1b"]), tmp.path(), &renderer).unwrap_err();

        assert!(matches!(err, DeckError::Render(_)));
        assert!(!tmp.path().join("cards.pdf").exists());
    }

    #[test]
    fn args_put_options_before_inputs() {
        let args = renderer_args(
            &[PathBuf::from("build/1a.svg"), PathBuf::from("build/1b.svg")],
            Path::new("build/cards.pdf"),
        );
        assert_eq!(
            args,
            ["--format=pdf", "--output=build/cards.pdf", "build/1a.svg", "build/1b.svg"]
                .map(OsString::from)
        );
    }
}
