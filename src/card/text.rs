use crate::svg::{escape, num};

/// Strings shorter than this stay on one line.
const BREAK_THRESHOLD: usize = 24;

/// Rough average glyph advance as a fraction of the font size.
const AVG_CHAR_EM: f64 = 0.5;

/// Line height relative to the font size.
const LINE_HEIGHT_EM: f64 = 6.0 / 5.2;

/// Splits a long artist or title over two lines.
///
/// Tries every break between words and keeps the one where both halves have
/// the most similar number of characters. Counting characters is not the
/// same as measuring glyphs, but it is close enough for card text.
pub fn line_break(s: &str) -> Vec<String> {
    if s.chars().count() < BREAK_THRESHOLD {
        return vec![s.to_string()];
    }

    let words = s.split(' ').collect::<Vec<_>>();
    let mut best = (s.to_string(), String::new());
    let mut best_diff = usize::MAX;

    for i in 1..words.len() {
        let top = words[..i].join(" ");
        let bot = words[i..].join(" ");
        let diff = top.chars().count().abs_diff(bot.chars().count());
        if diff < best_diff {
            best_diff = diff;
            best = (top, bot);
        }
    }

    match best {
        (top, bot) if bot.is_empty() => vec![top],
        (top, bot) => vec![top, bot],
    }
}

/// Shrinks `base_size` until the longest line fits in `width_mm`.
pub fn fit_font_size(lines: &[String], base_size: f64, width_mm: f64) -> f64 {
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let needed = longest as f64 * AVG_CHAR_EM * base_size;
    if needed <= width_mm {
        base_size
    } else {
        width_mm / (longest as f64 * AVG_CHAR_EM)
    }
}

/// `<text>` elements for `s`, centred horizontally on `x` and vertically
/// around `y`.
pub fn text_block(
    x: f64,
    y: f64,
    s: &str,
    class: &str,
    base_size: f64,
    width_mm: f64,
) -> String {
    let lines = line_break(s);
    let size = fit_font_size(&lines, base_size, width_mm);
    let line_height = size * LINE_HEIGHT_EM;
    let h = line_height * lines.len() as f64;
    let style = if size < base_size {
        format!(r#" style="font-size: {}px""#, num(size))
    } else {
        String::new()
    };

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let dy = line_height * (1 + i) as f64 - h / 2.0;
            format!(
                r#"<text x="{}" y="{}" text-anchor="middle" class="{class}"{style}>{}</text>"#,
                num(x),
                num(y + dy),
                escape(line)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
