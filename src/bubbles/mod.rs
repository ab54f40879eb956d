//! Speech-bubble layout and compositing.
//!
//! [`render`] is the entry point: it decodes a panel image, groups the
//! dialogue by speaker, fits and places one bubble per speaker, paints them
//! onto the panel and returns the flattened PNG.

pub mod canvas;
pub mod draw;
pub mod fit;
pub mod place;
pub mod segment;
pub mod text;
pub mod wrap;

use std::io::Write;
use std::path::Path;

use tracing::{debug, instrument};

use crate::error::ComicError;
use canvas::{Canvas, decode_image, encode_png};
use fit::{FitConstraints, fit_bubble};
use place::{StackingMode, place_bubble};
use segment::{SpeakerGroup, group_by_speaker};
use text::{TextMeasurer, Typeface};

/// Geometry and text of one bubble, derived per render.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleLayout {
    /// position of the speaker group in first-appearance order
    pub group_index: usize,
    /// font size in px
    pub font_size: u32,
    /// wrapped body lines
    pub lines: Vec<String>,
    /// left edge
    pub x: f32,
    /// top edge
    pub y: f32,
    /// bubble width
    pub width: f32,
    /// bubble height, without the tail
    pub height: f32,
}

/// Knobs for a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    /// how bubbles after the first are stacked
    pub stacking: StackingMode,
}

/// Fits and places every group for a `width` x `height` canvas.
pub fn layout_groups<M>(
    measurer: &M,
    groups: &[SpeakerGroup],
    width: u32,
    height: u32,
    options: LayoutOptions,
) -> Vec<BubbleLayout>
where
    M: TextMeasurer + ?Sized,
{
    let constraints = FitConstraints::for_canvas(width, height);
    let fits: Vec<_> = groups
        .iter()
        .map(|group| fit_bubble(measurer, &group.display_text(), &constraints))
        .collect();
    let heights: Vec<f32> = fits.iter().map(|fit| fit.height).collect();

    fits.into_iter()
        .enumerate()
        .map(|(index, fit)| {
            let pos = place_bubble(
                index,
                fit.width,
                &heights,
                (width, height),
                constraints.padding,
                options.stacking,
            );
            if fit.overflow {
                debug!(
                    group = index,
                    font_size = fit.font_size,
                    "bubble text overflows at the floor font size"
                );
            }
            BubbleLayout {
                group_index: index,
                font_size: fit.font_size,
                lines: fit.lines,
                x: pos.x,
                y: pos.y,
                width: fit.width,
                height: fit.height,
            }
        })
        .collect()
}

/// Lays out raw dialogue lines without drawing anything.
pub fn layout_panel<M, S>(
    measurer: &M,
    dialogue: &[S],
    width: u32,
    height: u32,
    options: LayoutOptions,
) -> Vec<BubbleLayout>
where
    M: TextMeasurer + ?Sized,
    S: AsRef<str>,
{
    layout_groups(measurer, &group_by_speaker(dialogue), width, height, options)
}

/// Renders dialogue bubbles onto panel images with a fixed typeface.
#[derive(Clone, Debug)]
pub struct Compositor<T> {
    typeface: T,
    options: LayoutOptions,
}

impl<T: Typeface> Compositor<T> {
    /// Compositor using the default layout options.
    pub fn new(typeface: T) -> Self {
        Self::with_options(typeface, LayoutOptions::default())
    }

    /// Compositor with explicit layout options.
    pub fn with_options(typeface: T, options: LayoutOptions) -> Self {
        Self { typeface, options }
    }

    /// Layout options in use.
    pub fn options(&self) -> LayoutOptions {
        self.options
    }

    /// See [`render_with`].
    pub fn render<S: AsRef<str>>(
        &self,
        base_image: &[u8],
        dialogue: &[S],
        output_path: Option<&Path>,
    ) -> Result<Vec<u8>, ComicError> {
        render_with(&self.typeface, base_image, dialogue, output_path, self.options)
    }
}

/// Renders with default layout options. See [`render_with`].
pub fn render<T, S>(
    typeface: &T,
    base_image: &[u8],
    dialogue: &[S],
    output_path: Option<&Path>,
) -> Result<Vec<u8>, ComicError>
where
    T: Typeface + ?Sized,
    S: AsRef<str>,
{
    render_with(typeface, base_image, dialogue, output_path, LayoutOptions::default())
}

/// Decodes `base_image`, draws one bubble per speaker and returns the PNG.
///
/// When `output_path` is set the PNG is also written there. Nothing is
/// returned or written unless every stage succeeds. With no dialogue the
/// decoded image comes back unchanged; otherwise pixels outside the bubbles
/// keep their decoded values, translucent ones included.
#[instrument(skip_all, fields(bytes = base_image.len(), lines = dialogue.len()))]
pub fn render_with<T, S>(
    typeface: &T,
    base_image: &[u8],
    dialogue: &[S],
    output_path: Option<&Path>,
    options: LayoutOptions,
) -> Result<Vec<u8>, ComicError>
where
    T: Typeface + ?Sized,
    S: AsRef<str>,
{
    let base = decode_image(base_image)?;
    let groups = group_by_speaker(dialogue);

    let png = if groups.is_empty() {
        encode_png(&base)?
    } else {
        let mut canvas = Canvas::from_rgba(&base)?;
        let layouts = layout_groups(typeface, &groups, canvas.width(), canvas.height(), options);
        for (group, layout) in groups.iter().zip(&layouts) {
            draw::draw_bubble(&mut canvas, typeface, layout, &group.speaker)?;
        }
        encode_png(&canvas.to_rgba_image_over(&base)?)?
    };
    debug!(
        width = base.width(),
        height = base.height(),
        groups = groups.len(),
        "panel rendered"
    );

    if let Some(path) = output_path {
        write_output(path, &png)?;
    }
    Ok(png)
}

fn write_output(path: &Path, png: &[u8]) -> Result<(), ComicError> {
    let persist = |err: std::io::Error| {
        ComicError::Persist(format!("failed to write {}: {err}", path.display()))
    };
    let mut file = std::fs::File::create(path).map_err(persist)?;
    file.write_all(png).map_err(persist)?;
    file.sync_all().map_err(persist)
}

#[cfg(test)]
mod tests {
    use super::*;
    use text::DeterministicTypeface;

    #[test]
    fn scenario_two_speakers_top_and_bottom() {
        let layouts = layout_panel(
            &DeterministicTypeface::default(),
            &[
                "Vincent: I think generative AI is the future.",
                "Adrien: Let's build a product with it.",
            ],
            1024,
            1024,
            LayoutOptions::default(),
        );
        assert_eq!(layouts.len(), 2);
        assert_eq!(layouts[0].y, 10.0);
        assert_eq!(layouts[1].y, 1024.0 - layouts[1].height - 10.0);
        for layout in &layouts {
            assert!(layout.x >= 0.0);
            assert!(layout.x + layout.width <= 1024.0);
            assert_eq!(layout.font_size, fit::INITIAL_FONT_SIZE);
        }
    }

    #[test]
    fn compositor_keeps_its_options() {
        let options = LayoutOptions {
            stacking: StackingMode::Cumulative,
        };
        let compositor = Compositor::with_options(DeterministicTypeface::default(), options);
        assert_eq!(compositor.options(), options);
    }
}
