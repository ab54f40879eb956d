//! Positions fitted bubbles on the canvas.

/// How bubbles after the first are stacked from the bottom edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum StackingMode {
    /// Spaces every bubble below the current one by the current bubble's
    /// own height. Matches previously generated comics but can overlap when
    /// bubble heights differ.
    #[default]
    SourceCompatible,
    /// Spaces by the real heights of the bubbles below.
    Cumulative,
}

/// Top-left corner of a bubble.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    /// left edge in px
    pub x: f32,
    /// top edge in px
    pub y: f32,
}

/// Computes where the bubble for group `index` goes.
///
/// `heights` holds the fitted height of every group in order, so
/// `heights.len()` is the group count and `heights[index]` the current
/// bubble's height. The first bubble hugs the top margin; the rest are
/// anchored to the bottom margin and stacked upward.
pub fn place_bubble(
    index: usize,
    width: f32,
    heights: &[f32],
    canvas: (u32, u32),
    padding: f32,
    mode: StackingMode,
) -> Position {
    let (canvas_width, canvas_height) = (canvas.0 as f32, canvas.1 as f32);
    let x = (canvas_width - width) / 2.0;
    let height = heights.get(index).copied().unwrap_or_default();

    let y = if index == 0 {
        padding
    } else {
        let below = heights.len().saturating_sub(index + 1);
        let stacked = match mode {
            StackingMode::SourceCompatible => below as f32 * (height + padding),
            StackingMode::Cumulative => heights
                .iter()
                .skip(index + 1)
                .map(|h| h + padding)
                .sum(),
        };
        canvas_height - height - padding - stacked
    };
    Position { x, y }
}
