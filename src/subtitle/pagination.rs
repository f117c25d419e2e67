/*!
 * Timing-aware pagination of wrapped cue lines.
 *
 * A cue whose text wraps to more than two lines is shown as several
 * consecutive pages. Each page gets an equal share of the cue's time,
 * independent of how many characters it holds. No text is ever dropped.
 */

use crate::subtitle::model::Page;

/// Lines shown on screen at once
pub const MAX_LINES_PER_PAGE: usize = 2;

/// Split `lines` into pages of at most two lines spanning `[cue_start, cue_end]`.
///
/// The last page always ends exactly at `cue_end`. With no lines a single
/// page holding one empty line covers the whole cue.
pub fn paginate(lines: &[String], cue_start: f64, cue_end: f64) -> Vec<Page> {
    if lines.is_empty() {
        return vec![Page::new(vec![String::new()], cue_start, cue_end)];
    }

    let num_pages = lines.len().div_ceil(MAX_LINES_PER_PAGE);
    let duration_per_page = (cue_end - cue_start) / num_pages as f64;

    lines
        .chunks(MAX_LINES_PER_PAGE)
        .enumerate()
        .map(|(i, page_lines)| {
            let start = cue_start + i as f64 * duration_per_page;
            let end = if i + 1 == num_pages {
                cue_end
            } else {
                cue_start + (i + 1) as f64 * duration_per_page
            };
            Page::new(page_lines.to_vec(), start, end)
        })
        .collect()
}
