//! Sheet geometry and rendering a sheet side to an SVG page.

use crate::{
    card::CardUnit,
    error::DeckError,
    layout::{Duplex, Grid, Sheet, Side},
    svg::{escape, num},
};

pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Cards in the commercial game are 65mm; 62mm keeps the crop marks of a
/// 3x4 table on A4 out of the printer's unprintable border.
pub const CARD_MM: f64 = 62.0;

/// Room around the table for crop marks.
const MIN_MARGIN_MM: f64 = 6.0;
const CROP_MARK_GAP_MM: f64 = 1.0;
const CROP_MARK_LEN_MM: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub width_mm: f64,
    pub height_mm: f64,
    pub card_mm: f64,
    pub grid: Grid,
    margin_x: f64,
    margin_top: f64,
}

impl PageGeometry {
    pub fn a4(grid: Grid) -> Result<Self, DeckError> {
        Self::new(A4_WIDTH_MM, A4_HEIGHT_MM, CARD_MM, grid)
    }

    /// The table is centred horizontally. Vertically it sits at the same
    /// distance from the top as from the sides, which leaves the spare room
    /// at the bottom for the footer.
    pub fn new(
        width_mm: f64,
        height_mm: f64,
        card_mm: f64,
        grid: Grid,
    ) -> Result<Self, DeckError> {
        let (tw, th) = (grid.cols as f64 * card_mm, grid.rows as f64 * card_mm);
        let margin_x = (width_mm - tw) / 2.0;
        if margin_x < MIN_MARGIN_MM {
            return Err(DeckError::Config(format!(
                "{} columns of {card_mm}mm cards do not fit on a {width_mm}mm wide page",
                grid.cols
            )));
        }
        if th + 2.0 * MIN_MARGIN_MM > height_mm {
            return Err(DeckError::Config(format!(
                "{} rows of {card_mm}mm cards do not fit on a {height_mm}mm high page",
                grid.rows
            )));
        }
        let margin_top = margin_x.min((height_mm - th) / 2.0);

        Ok(Self {
            width_mm,
            height_mm,
            card_mm,
            grid,
            margin_x,
            margin_top,
        })
    }

    pub fn table_size(&self) -> (f64, f64) {
        (
            self.grid.cols as f64 * self.card_mm,
            self.grid.rows as f64 * self.card_mm,
        )
    }

    /// Top-left corner of the table on one side of the sheet.
    ///
    /// The back is the mirror image of the front, so its table origin is
    /// mirrored along the flip axis too; otherwise an off-centre table would
    /// be printed shifted against its own back.
    pub fn origin(&self, side: Side, duplex: Duplex) -> (f64, f64) {
        let (tw, th) = self.table_size();
        match (side, duplex) {
            (Side::Front, _) => (self.margin_x, self.margin_top),
            (Side::Back, Duplex::LongEdge) => (self.width_mm - self.margin_x - tw, self.margin_top),
            (Side::Back, Duplex::ShortEdge) => {
                (self.margin_x, self.height_mm - self.margin_top - th)
            }
        }
    }

    pub fn slot_origin(&self, side: Side, duplex: Duplex, row: usize, col: usize) -> (f64, f64) {
        let (x0, y0) = self.origin(side, duplex);
        (
            x0 + col as f64 * self.card_mm,
            y0 + row as f64 * self.card_mm,
        )
    }
}

#[derive(Debug, Clone)]
pub struct PageStyle<'a> {
    pub font: &'a str,
    pub grid: bool,
    pub crop_marks: bool,
    pub duplex: Duplex,
}

/// Renders one side of a sheet. `cards` is indexed by the sheet's slots.
pub fn render_page(
    sheet: &Sheet,
    cards: &[CardUnit],
    geometry: &PageGeometry,
    style: &PageStyle,
) -> Result<String, DeckError> {
    let (w, h) = (geometry.width_mm, geometry.height_mm);
    let side_mm = geometry.card_mm;
    let (x0, y0) = geometry.origin(sheet.side, style.duplex);
    let (tw, th) = geometry.table_size();

    let mut parts = vec![
        format!(
            r#"<svg version="1.1" width="{w}mm" height="{h}mm" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"#,
            num(w),
            num(h)
        ),
        format!(
            r#"<style>
text {{ font-family: "{}"; }}
.year {{ font-size: 18px; font-weight: 900; }}
.title, .artist, .footer {{ font-size: 5.2px; font-weight: 400; }}
.title {{ font-style: italic; }}
.brand {{ font-size: 3.5px; font-weight: 700; }}
rect, line {{ stroke: black; stroke-width: 0.2; fill: none; }}
</style>"#,
            escape(style.font)
        ),
    ];

    for (row, col, card) in sheet.cells() {
        let (x, y) = geometry.slot_origin(sheet.side, style.duplex, row, col);
        if style.grid {
            parts.push(format!(
                r#"<rect class="slot" x="{}" y="{}" width="{}" height="{}"/>"#,
                num(x),
                num(y),
                num(side_mm),
                num(side_mm)
            ));
        }
        let Some(card) = card else { continue };
        let card = cards.get(card).ok_or_else(|| {
            DeckError::Render(format!("sheet {} refers to missing card {card}", sheet.label()))
        })?;
        let artwork = match sheet.side {
            Side::Front => &card.front,
            Side::Back => &card.back,
        };
        parts.push(format!(
            r#"<g transform="translate({} {})">"#,
            num(x),
            num(y)
        ));
        parts.push(artwork.svg().to_string());
        parts.push("</g>".to_string());
    }

    if style.crop_marks {
        let line = |x1: f64, y1: f64, x2: f64, y2: f64| {
            format!(
                r#"<line class="crop" x1="{}" y1="{}" x2="{}" y2="{}"/>"#,
                num(x1),
                num(y1),
                num(x2),
                num(y2)
            )
        };
        let (near, far) = (CROP_MARK_GAP_MM, CROP_MARK_GAP_MM + CROP_MARK_LEN_MM);
        for ix in 0..=sheet.grid.cols {
            let x = x0 + ix as f64 * side_mm;
            parts.push(line(x, y0 - far, x, y0 - near));
            parts.push(line(x, y0 + th + near, x, y0 + th + far));
        }
        for iy in 0..=sheet.grid.rows {
            let y = y0 + iy as f64 * side_mm;
            parts.push(line(x0 - far, y, x0 - near, y));
            parts.push(line(x0 + tw + near, y, x0 + tw + far, y));
        }
    }

    // Footer in the larger of the bands above and below the table.
    let (above, below) = (y0, h - y0 - th);
    let footer_y = if below >= above {
        y0 + th + below / 2.0 + 1.8
    } else {
        above / 2.0 + 1.8
    };
    parts.push(format!(
        r#"<text x="{}" y="{}" text-anchor="end" class="footer">{}</text>"#,
        num(x0 + tw),
        num(footer_y),
        sheet.label()
    ));

    parts.push("</svg>".to_string());
    Ok(parts.join("\n"))
}
