//! Font size and wrap selection for one bubble.

use super::text::TextMeasurer;
use super::wrap::wrap_text;

/// Starting font size in px.
pub const INITIAL_FONT_SIZE: u32 = 20;
/// Smallest font size tried; below this, overflow is accepted.
pub const FLOOR_FONT_SIZE: u32 = 12;
/// Inner padding of a bubble and margin to the canvas edges, in px.
pub const BUBBLE_PADDING: f32 = 10.0;
/// Line advance as a multiple of the font size.
pub const LINE_SPACING: f32 = 1.2;
/// Widest a bubble may be, as a fraction of the canvas width.
pub const MAX_WIDTH_RATIO: f32 = 0.8;
/// Tallest a bubble may be, as a fraction of the canvas height.
pub const MAX_HEIGHT_RATIO: f32 = 0.4;

/// Size limits a bubble is fitted against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitConstraints {
    /// maximum bubble width in px
    pub max_width: f32,
    /// maximum bubble height in px
    pub max_height: f32,
    /// inner padding in px
    pub padding: f32,
    /// line advance factor
    pub line_spacing: f32,
    /// first font size tried
    pub initial_font_size: u32,
    /// last font size tried
    pub floor_font_size: u32,
}

impl FitConstraints {
    /// Standard limits for a canvas of the given size.
    pub fn for_canvas(width: u32, height: u32) -> Self {
        Self {
            max_width: width as f32 * MAX_WIDTH_RATIO,
            max_height: height as f32 * MAX_HEIGHT_RATIO,
            padding: BUBBLE_PADDING,
            line_spacing: LINE_SPACING,
            initial_font_size: INITIAL_FONT_SIZE,
            floor_font_size: FLOOR_FONT_SIZE,
        }
    }

    /// Pixel budget for a single wrapped line.
    pub fn line_budget(&self) -> f32 {
        self.max_width - 2.0 * self.padding
    }

    /// Upper bound on the number of fitting passes.
    pub fn max_iterations(&self) -> u32 {
        self.initial_font_size.saturating_sub(self.floor_font_size) + 1
    }
}

/// Outcome of fitting one group's text.
#[derive(Clone, Debug, PartialEq)]
pub struct BubbleFit {
    /// chosen font size in px
    pub font_size: u32,
    /// wrapped body lines
    pub lines: Vec<String>,
    /// bubble width, clamped to the maximum
    pub width: f32,
    /// bubble height including the speaker line
    pub height: f32,
    /// number of passes taken
    pub iterations: u32,
    /// true when the floor was reached without fitting
    pub overflow: bool,
}

/// Shrinks the font from the initial size until the bubble fits, stopping at
/// the floor.
///
/// Each pass lowers the size by one, so the loop runs at most
/// [`FitConstraints::max_iterations`] times. Fit is judged on the unclamped
/// content width, so an overlong word keeps shrinking the font even though
/// the reported width is clamped.
pub fn fit_bubble<M>(measurer: &M, text: &str, constraints: &FitConstraints) -> BubbleFit
where
    M: TextMeasurer + ?Sized,
{
    let floor = constraints.floor_font_size.min(constraints.initial_font_size);
    let mut font_size = constraints.initial_font_size;
    let mut iterations = 0;

    loop {
        iterations += 1;
        let size = font_size as f32;
        let measure = |line: &str| measurer.measure(line, size);

        let lines = wrap_text(text, constraints.line_budget(), measure);
        let content_width = lines
            .iter()
            .map(|line| measure(line))
            .fold(0.0_f32, f32::max)
            + 2.0 * constraints.padding;
        let width = content_width.min(constraints.max_width);
        let height = (lines.len() + 1) as f32 * size * constraints.line_spacing
            + 2.0 * constraints.padding;

        let fits = content_width <= constraints.max_width && height <= constraints.max_height;
        if fits || font_size <= floor {
            return BubbleFit {
                font_size,
                lines,
                width,
                height,
                iterations,
                overflow: !fits,
            };
        }
        font_size -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubbles::text::DeterministicTypeface;

    fn face() -> DeterministicTypeface {
        DeterministicTypeface::default()
    }

    #[test]
    fn short_text_fits_at_initial_size() {
        let constraints = FitConstraints::for_canvas(1024, 1024);
        let fit = fit_bubble(&face(), "Let's build a product with it.", &constraints);
        assert_eq!(fit.font_size, INITIAL_FONT_SIZE);
        assert_eq!(fit.iterations, 1);
        assert_eq!(fit.lines, vec!["Let's build a product with it."]);
        // 30 chars * 12px + 2 * 10px padding
        assert!((fit.width - 380.0).abs() < 1e-2);
        // two lines (speaker + body) * 20 * 1.2 + 20
        assert!((fit.height - 68.0).abs() < 1e-2);
        assert!(!fit.overflow);
    }

    #[test]
    fn empty_text_gives_minimum_bubble() {
        let constraints = FitConstraints::for_canvas(400, 400);
        let fit = fit_bubble(&face(), "", &constraints);
        assert_eq!(fit.lines, vec![""]);
        assert!((fit.width - 20.0).abs() < 1e-4);
        assert!((fit.height - 68.0).abs() < 1e-2);
    }

    #[test]
    fn tall_text_shrinks_font() {
        // 160px bubble, 140px line budget, 80px max height
        let constraints = FitConstraints::for_canvas(200, 200);
        let text = "word ".repeat(20);
        let fit = fit_bubble(&face(), &text, &constraints);
        assert!(fit.font_size < INITIAL_FONT_SIZE);
        assert!(fit.iterations > 1);
        assert!(fit.font_size == FLOOR_FONT_SIZE || fit.height <= constraints.max_height);
    }

    #[test]
    fn overlong_word_reaches_floor_without_failing() {
        let constraints = FitConstraints::for_canvas(1024, 1024);
        // 140 chars are 1008px even at 12px, over the 799.2px line budget
        let word = "x".repeat(140);
        let fit = fit_bubble(&face(), &word, &constraints);
        assert_eq!(fit.font_size, FLOOR_FONT_SIZE);
        assert!(fit.overflow);
        assert_eq!(fit.lines, vec![word.clone()]);
        assert!(fit.width <= constraints.max_width);
        assert_eq!(fit.iterations, constraints.max_iterations());
    }

    #[test]
    fn converges_within_bound_and_lines_fit_unless_floor() {
        let chatter = "many words in a row ".repeat(30);
        let wall = "z".repeat(300);
        let texts: [&str; 5] = [
            "",
            "Hi.",
            "I think generative AI is the future. We should build something.",
            &chatter,
            &wall,
        ];
        for (w, h) in [(1024, 1024), (512, 256), (300, 900), (120, 120)] {
            let constraints = FitConstraints::for_canvas(w, h);
            for text in texts {
                let fit = fit_bubble(&face(), text, &constraints);
                assert!(fit.iterations <= constraints.max_iterations());
                assert!(fit.width <= constraints.max_width + 1e-3);
                if fit.overflow {
                    assert_eq!(fit.font_size, FLOOR_FONT_SIZE);
                    continue;
                }
                assert!(fit.height <= constraints.max_height);
                for line in &fit.lines {
                    assert!(
                        face().measure(line, fit.font_size as f32)
                            <= constraints.line_budget() + 1e-3
                    );
                }
            }
        }
    }
}
