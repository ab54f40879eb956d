//! Paints a laid-out bubble onto the canvas.

use tiny_skia::{Color, ColorU8, Path, PathBuilder};

use super::BubbleLayout;
use super::canvas::Canvas;
use super::fit::{BUBBLE_PADDING, LINE_SPACING};
use super::text::{FontWeight, Typeface};
use crate::error::{ComicError, RenderStage};

/// Largest corner radius of the bubble outline.
const MAX_CORNER_RADIUS: f32 = 20.0;
/// Width of the outline stroke in px.
const OUTLINE_WIDTH: f32 = 2.0;
/// Half the width of the tail's base.
const TAIL_HALF_WIDTH: f32 = 10.0;
/// How far the tail hangs below the bubble.
const TAIL_DEPTH: f32 = 10.0;

const INK: ColorU8 = ColorU8::from_rgba(0, 0, 0, 255);

/// Corner radius for a bubble of the given size.
pub fn corner_radius(width: f32, height: f32) -> f32 {
    MAX_CORNER_RADIUS.min(width / 4.0).min(height / 4.0)
}

/// Rounded rectangle with quadratic corners.
pub fn bubble_outline(x: f32, y: f32, width: f32, height: f32) -> Option<Path> {
    let r = corner_radius(width, height);
    let (right, bottom) = (x + width, y + height);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.quad_to(right, y, right, y + r);
    pb.line_to(right, bottom - r);
    pb.quad_to(right, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.quad_to(x, bottom, x, bottom - r);
    pb.line_to(x, y + r);
    pb.quad_to(x, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Downward-pointing triangle centred under the bubble.
pub fn tail_outline(x: f32, y: f32, width: f32, height: f32) -> Option<Path> {
    let centre = x + width / 2.0;
    let bottom = y + height;

    let mut pb = PathBuilder::new();
    pb.move_to(centre - TAIL_HALF_WIDTH, bottom);
    pb.line_to(centre, bottom + TAIL_DEPTH);
    pb.line_to(centre + TAIL_HALF_WIDTH, bottom);
    pb.close();
    pb.finish()
}

/// Draws the bubble body, its tail, the bold speaker name and the wrapped
/// lines for one group.
pub fn draw_bubble<T>(
    canvas: &mut Canvas,
    typeface: &T,
    layout: &BubbleLayout,
    speaker: &str,
) -> Result<(), ComicError>
where
    T: Typeface + ?Sized,
{
    let BubbleLayout {
        x,
        y,
        width,
        height,
        ..
    } = *layout;
    let group = Some(layout.group_index);

    let body = bubble_outline(x, y, width, height)
        .ok_or_else(|| ComicError::render(RenderStage::Draw, group, "empty bubble outline"))?;
    canvas.fill_and_stroke(&body, Color::WHITE, Color::BLACK, OUTLINE_WIDTH);

    let tail = tail_outline(x, y, width, height)
        .ok_or_else(|| ComicError::render(RenderStage::Draw, group, "empty tail outline"))?;
    canvas.fill_and_stroke(&tail, Color::WHITE, Color::BLACK, OUTLINE_WIDTH);

    let size = layout.font_size as f32;
    let left = x + BUBBLE_PADDING;
    typeface.draw_text(
        canvas,
        speaker,
        left,
        y + BUBBLE_PADDING,
        size,
        FontWeight::Bold,
        INK,
    );
    for (i, line) in layout.lines.iter().enumerate() {
        let top = y + BUBBLE_PADDING + size * LINE_SPACING * (i + 1) as f32;
        typeface.draw_text(canvas, line, left, top, size, FontWeight::Regular, INK);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubbles::text::DeterministicTypeface;
    use image::{Rgba, RgbaImage};

    fn grey_canvas(width: u32, height: u32) -> Canvas {
        Canvas::from_rgba(&RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255])))
            .expect("canvas")
    }

    #[test]
    fn radius_is_capped() {
        assert_eq!(corner_radius(400.0, 300.0), 20.0);
        assert_eq!(corner_radius(40.0, 300.0), 10.0);
        assert_eq!(corner_radius(400.0, 48.0), 12.0);
    }

    #[test]
    fn unbuildable_outline_reports_draw_stage_and_group() {
        let mut canvas = grey_canvas(50, 50);
        let layout = BubbleLayout {
            group_index: 3,
            font_size: 12,
            lines: vec![String::new()],
            x: f32::NAN,
            y: 10.0,
            width: 30.0,
            height: 20.0,
        };
        let err = draw_bubble(&mut canvas, &DeterministicTypeface::default(), &layout, "A")
            .expect_err("NaN geometry cannot be drawn");
        assert!(matches!(
            err,
            ComicError::Render {
                stage: RenderStage::Draw,
                group: Some(3),
                ..
            }
        ));
    }

    #[test]
    fn paints_body_tail_and_text() {
        let mut canvas = grey_canvas(200, 200);
        let layout = BubbleLayout {
            group_index: 0,
            font_size: 20,
            lines: vec!["hi".to_string()],
            x: 20.0,
            y: 20.0,
            width: 160.0,
            height: 100.0,
        };
        draw_bubble(&mut canvas, &DeterministicTypeface::default(), &layout, "Al")
            .expect("draw");
        let out = canvas.to_rgba_image().expect("rgba");

        // inside the body, away from the text
        assert_eq!(out.get_pixel(150, 100).0, [255, 255, 255, 255]);
        // outside everything
        assert_eq!(out.get_pixel(5, 5).0, [128, 128, 128, 255]);
        // tail interior just under the bubble's bottom edge at the centre
        assert_eq!(out.get_pixel(100, 123).0, [255, 255, 255, 255]);
        // beside the tail the background is untouched
        assert_eq!(out.get_pixel(60, 126).0, [128, 128, 128, 255]);
        // speaker block glyph at (30, 30) + 3px inset, size 20: rows 33..47
        assert_eq!(out.get_pixel(33, 40).0, [0, 0, 0, 255]);
        // body line sits one line (24px) below the speaker
        assert_eq!(out.get_pixel(33, 64).0, [0, 0, 0, 255]);
    }
}
