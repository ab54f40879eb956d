//! Text measurement and glyph painting.
//!
//! Layout only ever needs [`TextMeasurer`]; drawing needs the wider
//! [`Typeface`]. Both must return identical results for identical input
//! during a render, otherwise wrap and fit decisions stop matching what
//! ends up on the canvas.

use std::path::Path;

use fontdue::{Font, FontSettings};
use tiny_skia::ColorU8;

use super::canvas::Canvas;
use crate::error::ComicError;

/// Measures rendered text width.
pub trait TextMeasurer: Send + Sync {
    /// Width in pixels of `text` set at `font_size` px.
    fn measure(&self, text: &str, font_size: f32) -> f32;
}

/// Weight of a text run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontWeight {
    /// body text
    Regular,
    /// speaker names
    Bold,
}

/// A measurer that can also paint what it measures.
pub trait Typeface: TextMeasurer {
    /// Paints `text` with its top-left corner at `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &self,
        canvas: &mut Canvas,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        weight: FontWeight,
        color: ColorU8,
    );
}

/// Typeface backed by TrueType/OpenType faces rasterised with fontdue.
pub struct FontdueTypeface {
    regular: Font,
    bold: Option<Font>,
}

impl std::fmt::Debug for FontdueTypeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueTypeface")
            .field("regular", &self.regular.name())
            .field("bold", &self.bold.as_ref().map(|font| font.name()))
            .finish()
    }
}

impl FontdueTypeface {
    /// Builds a typeface from font file bytes.
    pub fn from_bytes(regular: &[u8], bold: Option<&[u8]>) -> Result<Self, ComicError> {
        let regular = parse_font(regular)?;
        let bold = bold.map(parse_font).transpose()?;
        Ok(Self { regular, bold })
    }

    /// Loads the regular face (and optionally a bold face) from disk.
    pub fn load(regular: &Path, bold: Option<&Path>) -> Result<Self, ComicError> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|err| {
                ComicError::InternalServerError(format!(
                    "failed to read font {}: {err}",
                    path.display()
                ))
            })
        };
        let regular_bytes = read(regular)?;
        let bold_bytes = bold.map(read).transpose()?;
        Self::from_bytes(&regular_bytes, bold_bytes.as_deref())
    }

    fn face(&self, weight: FontWeight) -> &Font {
        match (weight, &self.bold) {
            (FontWeight::Bold, Some(bold)) => bold,
            _ => &self.regular,
        }
    }

    fn paint_run(
        font: &Font,
        canvas: &mut Canvas,
        text: &str,
        origin: (f32, f32),
        font_size: f32,
        color: ColorU8,
    ) {
        let ascent = font
            .horizontal_line_metrics(font_size)
            .map(|metrics| metrics.ascent)
            .unwrap_or(font_size * 0.8);
        let baseline = origin.1 + ascent;
        let mut pen_x = origin.0;
        let mut prev: Option<char> = None;

        for ch in text.chars() {
            if let Some(left) = prev {
                pen_x += font.horizontal_kern(left, ch, font_size).unwrap_or(0.0);
            }
            let (metrics, bitmap) = font.rasterize(ch, font_size);
            let left = pen_x.round() as i32 + metrics.xmin;
            let top = baseline.round() as i32 - metrics.ymin - metrics.height as i32;
            for (row, line) in bitmap.chunks(metrics.width.max(1)).enumerate() {
                for (col, coverage) in line.iter().enumerate() {
                    canvas.blend_coverage(left + col as i32, top + row as i32, *coverage, color);
                }
            }
            pen_x += metrics.advance_width;
            prev = Some(ch);
        }
    }
}

fn parse_font(bytes: &[u8]) -> Result<Font, ComicError> {
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|err| ComicError::InternalServerError(format!("invalid font data: {err}")))
}

impl TextMeasurer for FontdueTypeface {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        let mut width = 0.0;
        let mut prev: Option<char> = None;
        for ch in text.chars() {
            if let Some(left) = prev {
                width += self
                    .regular
                    .horizontal_kern(left, ch, font_size)
                    .unwrap_or(0.0);
            }
            width += self.regular.metrics(ch, font_size).advance_width;
            prev = Some(ch);
        }
        width
    }
}

impl Typeface for FontdueTypeface {
    fn draw_text(
        &self,
        canvas: &mut Canvas,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        weight: FontWeight,
        color: ColorU8,
    ) {
        let font = self.face(weight);
        Self::paint_run(font, canvas, text, (x, y), font_size, color);
        if weight == FontWeight::Bold && self.bold.is_none() {
            // no bold face loaded: overstrike one pixel to the right
            Self::paint_run(font, canvas, text, (x + 1.0, y), font_size, color);
        }
    }
}

/// Font-free typeface with fixed per-character advance.
///
/// Every character advances `char_width_factor * font_size`; visible
/// characters are painted as solid blocks. Results never depend on
/// installed fonts, which makes layouts reproducible anywhere.
#[derive(Clone, Debug)]
pub struct DeterministicTypeface {
    /// advance per character as a fraction of the font size
    pub char_width_factor: f32,
}

impl Default for DeterministicTypeface {
    fn default() -> Self {
        Self {
            char_width_factor: 0.6,
        }
    }
}

impl TextMeasurer for DeterministicTypeface {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * self.char_width_factor * font_size
    }
}

impl Typeface for DeterministicTypeface {
    fn draw_text(
        &self,
        canvas: &mut Canvas,
        text: &str,
        x: f32,
        y: f32,
        font_size: f32,
        weight: FontWeight,
        color: ColorU8,
    ) {
        let advance = self.char_width_factor * font_size;
        let stem = match weight {
            FontWeight::Regular => 0.6,
            FontWeight::Bold => 0.85,
        };
        let glyph_w = (advance * stem).round().max(1.0) as i32;
        let glyph_h = (font_size * 0.7).round().max(1.0) as i32;
        let top = (y + font_size * 0.15).round() as i32;

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = (x + advance * i as f32).round() as i32;
            for py in top..top + glyph_h {
                for px in left..left + glyph_w {
                    canvas.blend_coverage(px, py, 255, color);
                }
            }
        }
    }
}
