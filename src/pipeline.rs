//! One complete run: tracks directory in, clips and card deck out.

use std::path::PathBuf;

use crate::{
    card::{self, CardStyle},
    clip::{TranscodeReport, Transcoder, sweep_partials, transcode_all},
    config::Config,
    document::{Page, assemble},
    domain::track::{AnonymizedAsset, Track},
    error::DeckError,
    layout::{Deck, PageGeometry, PageStyle, paginate, render_page},
    library::{TagSource, resolve_track, scan_tracks_dir},
    process::Process,
    stats::Distribution,
};

/// The outside world a run talks to.
pub struct Collaborators<'a> {
    pub tags: &'a dyn TagSource,
    pub transcoder: &'a dyn Process,
    pub renderer: &'a dyn Process,
}

#[derive(Debug)]
pub struct RunReport {
    pub distribution: Distribution,
    pub transcode: TranscodeReport,
    pub cards: usize,
    pub pages: usize,
    /// `None` when there were no tracks
    pub deck: Option<PathBuf>,
}

/// Reads every track, fails on the first one that can't become a card.
fn load_tracks(
    config: &Config,
    tags: &dyn TagSource,
) -> Result<Vec<(Track, AnonymizedAsset)>, DeckError> {
    let paths = scan_tracks_dir(&config.tracks_dir)?;
    log::info!(
        "Processing {} files from {}...",
        paths.len(),
        config.tracks_dir.display()
    );

    let mut items = paths
        .iter()
        .map(|path| {
            let track = resolve_track(path, tags)?;
            let asset = AnonymizedAsset::new(&track, &config.songs_dir, &config.url_prefix);
            Ok((track, asset))
        })
        .collect::<Result<Vec<_>, DeckError>>()?;

    // Identifier order: stable across runs, unrelated to file names or years.
    items.sort_by(|(_, a), (_, b)| a.id.cmp(&b.id));

    if let Some(pair) = items.windows(2).find(|w| w[0].1.id == w[1].1.id) {
        return Err(DeckError::DuplicateTrack {
            id: pair[0].1.id.to_hex(),
            first: pair[0].0.path.clone(),
            second: pair[1].0.path.clone(),
        });
    }
    Ok(items)
}

pub fn run(config: &Config, tools: &Collaborators) -> Result<RunReport, DeckError> {
    let grid = config.grid();
    let geometry = PageGeometry::a4(grid)?;

    std::fs::create_dir_all(&config.songs_dir)?;
    std::fs::create_dir_all(&config.build_dir)?;
    sweep_partials(&config.songs_dir)?;

    let items = load_tracks(config, tools.tags)?;

    log::info!("Encoding {} tracks to MP4...", items.len());
    let transcoder = Transcoder::new(tools.transcoder, config.clip_start);
    let transcode = transcode_all(&items, &transcoder, config.jobs)?;
    log::info!(
        "{} clips encoded, {} already present",
        transcode.encoded,
        transcode.cached
    );

    let distribution = Distribution::of(items.iter().map(|(track, _)| track));

    let card_style = CardStyle {
        side_mm: geometry.card_mm,
        branding: config.branding.clone(),
    };
    let cards = items
        .iter()
        .map(|(track, asset)| card::render(track, asset, &card_style))
        .collect::<Result<Vec<_>, _>>()?;
    for card in &cards {
        log::debug!("Card {} <- {}", card.id, card.source.display());
    }

    let deck = Deck::new(paginate(cards.len(), grid, config.duplex), config.page_order);
    if deck.is_empty() {
        log::warn!("No tracks found in {}", config.tracks_dir.display());
    }
    let page_style = PageStyle {
        font: &config.font,
        grid: config.grid,
        crop_marks: config.crop_marks,
        duplex: config.duplex,
    };
    let pages = deck
        .pages
        .iter()
        .map(|sheet| {
            log::debug!("Page {}: {} cards", sheet.label(), sheet.occupied());
            Ok(Page {
                label: sheet.label(),
                svg: render_page(sheet, &cards, &geometry, &page_style)?,
            })
        })
        .collect::<Result<Vec<_>, DeckError>>()?;

    let deck_path = assemble(&pages, &config.build_dir, tools.renderer)?;

    Ok(RunReport {
        distribution,
        transcode,
        cards: cards.len(),
        pages: pages.len(),
        deck: deck_path,
    })
}
