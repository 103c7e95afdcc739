//! Front and back artwork of a single card.
//!
//! Artwork is an SVG fragment in card coordinates: millimetres, origin at
//! the card's top-left corner. The page renderer places it in a slot.

use std::path::PathBuf;

use crate::{
    domain::{
        hash::AssetId,
        track::{AnonymizedAsset, Track},
    },
    error::DeckError,
    svg::{escape, num},
};

pub mod qr;
pub mod text;

/// Part of the card side the QR code spans.
const QR_FRACTION: f64 = 0.75;

/// Horizontal padding kept free of text on the back.
const TEXT_PADDING_MM: f64 = 3.0;

pub const ARTIST_FONT_SIZE: f64 = 5.2;
pub const TITLE_FONT_SIZE: f64 = 5.2;

#[derive(Debug, Clone)]
pub struct CardStyle {
    pub side_mm: f64,
    pub branding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork(String);

impl Artwork {
    pub fn svg(&self) -> &str {
        &self.0
    }
}

/// Both sides of one card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardUnit {
    pub id: AssetId,
    pub source: PathBuf,
    /// QR code of the clip url
    pub front: Artwork,
    /// artist, year and title
    pub back: Artwork,
}

pub fn render(
    track: &Track,
    asset: &AnonymizedAsset,
    style: &CardStyle,
) -> Result<CardUnit, DeckError> {
    Ok(CardUnit {
        id: asset.id.clone(),
        source: track.path.clone(),
        front: render_front(asset, style)?,
        back: render_back(track, style),
    })
}

fn render_front(asset: &AnonymizedAsset, style: &CardStyle) -> Result<Artwork, DeckError> {
    let side = style.side_mm;
    let size = side * QR_FRACTION;
    let offset = (side - size) / 2.0;

    let mut parts = vec![qr::qr_svg(&asset.url, offset, offset, size)?];
    if let Some(branding) = &style.branding {
        parts.push(format!(
            r#"<text x="{}" y="{}" text-anchor="middle" class="brand">{}</text>"#,
            num(side / 2.0),
            num(side - offset / 2.0 + 1.0),
            escape(branding)
        ));
    }
    Ok(Artwork(parts.join("\n")))
}

fn render_back(track: &Track, style: &CardStyle) -> Artwork {
    let side = style.side_mm;
    let mid = side / 2.0;
    let width = side - 2.0 * TEXT_PADDING_MM;

    let parts = [
        text::text_block(mid, mid - 19.0, &track.artist, "artist", ARTIST_FONT_SIZE, width),
        format!(
            r#"<text x="{}" y="{}" text-anchor="middle" class="year">{}</text>"#,
            num(mid),
            num(mid + 6.5),
            track.year
        ),
        text::text_block(mid, mid + 18.0, &track.title, "title", TITLE_FONT_SIZE, width),
    ];
    Artwork(parts.join("\n"))
}
