//! # Adaptive Font Fitting
//!
//! Two searches over font size:
//!
//! - [`fit_text`] scans a descending size range and keeps the largest size at
//!   which the wrapped summary loses no words.
//! - [`fit_single_line`] shrinks a one-line string (the temperature) until it
//!   fits the available width or reaches a floor size.
//!
//! Both take a loader `size -> font` so any [`TextMeasure`] implementation can
//! be plugged in. A linear scan is enough: sizes are bounded by the layout
//! profile and text never gets wider as the size drops.

use crate::fonts::TextMeasure;
use crate::text_wrap::{wrap_text, word_count};
use log::debug;

/// Result of a multi-line fit.
#[derive(Debug)]
pub struct FittedText<F> {
    /// Font size the lines were wrapped at
    pub size: u32,
    pub font: F,
    pub lines: Vec<String>,
}

/// Find the largest size in `min_size..=max_size` whose wrap keeps every word.
///
/// When no size fits, the text is wrapped at `min_size` and returned
/// truncated. The result carries no flag for that case.
pub fn fit_text<F, L>(
    text: &str,
    mut load: L,
    max_width: u32,
    max_lines: usize,
    max_size: u32,
    min_size: u32,
) -> FittedText<F>
where
    F: TextMeasure,
    L: FnMut(u32) -> F,
{
    let total_words = text.split_whitespace().count();

    for size in (min_size..=max_size).rev() {
        let font = load(size);
        let lines = wrap_text(text, |s| font.text_width(s), max_width, max_lines);
        if word_count(&lines) >= total_words {
            debug!("summary fits at size {} in {} line(s)", size, lines.len());
            return FittedText { size, font, lines };
        }
    }

    debug!(
        "summary does not fit between {} and {}, truncating at {}",
        max_size, min_size, min_size
    );
    let font = load(min_size);
    let lines = wrap_text(text, |s| font.text_width(s), max_width, max_lines);
    FittedText {
        size: min_size,
        font,
        lines,
    }
}

/// Shrink `text` one size at a time until it fits `max_width` or the size
/// reaches `floor_size`.
pub fn fit_single_line<F, L>(
    text: &str,
    mut load: L,
    max_width: u32,
    start_size: u32,
    floor_size: u32,
) -> (u32, F)
where
    F: TextMeasure,
    L: FnMut(u32) -> F,
{
    let mut size = start_size;
    let mut font = load(size);
    while font.text_width(text) > max_width && size > floor_size {
        size -= 1;
        font = load(size);
    }
    (size, font)
}
