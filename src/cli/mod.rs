use anyhow::{Context, ensure};
use clap::Parser;
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::library::LoftyTags;
use crate::pipeline::{self, Collaborators};
use crate::process::SystemProcess;

#[derive(Parser)]
#[command(name = "mkhitsgame")]
#[command(version)]
#[command(about = "Build a printable music year guessing card deck with anonymized clips")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Maximum number of transcoder processes at once
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    if let Some(jobs) = cli.jobs {
        ensure!(jobs > 0, "--jobs must be at least 1");
        cfg.jobs = jobs;
    }

    let transcoder = SystemProcess::new(&cfg.transcoder);
    let renderer = SystemProcess::new(&cfg.renderer);
    let report = pipeline::run(
        &cfg,
        &Collaborators {
            tags: &LoftyTags,
            transcoder: &transcoder,
            renderer: &renderer,
        },
    )?;

    println!("{}", report.distribution);
    println!();
    println!(
        "{} clips encoded, {} already up to date",
        report.transcode.encoded, report.transcode.cached
    );
    if let Some(deck) = &report.deck {
        println!(
            "{} cards on {} pages written to {}",
            report.cards,
            report.pages,
            deck.display()
        );
    }
    Ok(())
}
