use qrcode::{Color, EcLevel, QrCode};

use crate::{error::DeckError, svg::num};

/// Error correction used for every code. Medium survives the smudges and
/// slightly off-register prints a home printer produces.
pub const EC_LEVEL: EcLevel = EcLevel::M;

/// Encodes `data` and returns the dark modules as a single SVG path in module
/// units, together with the code's width in modules.
pub fn qr_path(data: &str) -> Result<(String, usize), DeckError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EC_LEVEL)
        .map_err(|e| DeckError::Render(format!("failed to encode QR code for {data}: {e}")))?;
    let width = code.width();
    let colors = code.to_colors();

    let mut d = String::new();
    for (y, row) in colors.chunks(width).enumerate() {
        let mut x = 0;
        while x < width {
            if row[x] != Color::Dark {
                x += 1;
                continue;
            }
            let start = x;
            while x < width && row[x] == Color::Dark {
                x += 1;
            }
            d.push_str(&format!("M{start},{y}h{}v1h-{}z", x - start, x - start));
        }
    }
    Ok((d, width))
}

/// The code scaled to `size_mm` with its top-left corner at (`x`, `y`).
pub fn qr_svg(data: &str, x: f64, y: f64, size_mm: f64) -> Result<String, DeckError> {
    let (d, width) = qr_path(data)?;
    let module = size_mm / width as f64;
    Ok(format!(
        r#"<path transform="translate({} {}) scale({})" d="{d}" fill="black" stroke="none"/>"#,
        num(x),
        num(y),
        num(module)
    ))
}
