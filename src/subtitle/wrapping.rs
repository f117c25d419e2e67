/*!
 * Width-constrained line wrapping for cue text.
 *
 * Lengths are counted in characters, not bytes. Words are never split: a
 * word longer than the limit gets a line of its own and overflows it.
 */

/// Common broadcast limit for one subtitle line
pub const DEFAULT_MAX_CHARS: usize = 42;

/// Wrap `text` into lines of at most `max_chars` characters.
///
/// Explicit newlines are hard breaks: paragraphs are packed independently
/// and never merged. Blank paragraphs are dropped since a blank line would
/// terminate a subtitle block. Empty input yields a single empty line.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        pack_words(paragraph.split_whitespace(), max_chars, &mut lines);
    }

    let lines = rewrap_overlong(lines, max_chars);

    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Re-pack any multi-word line that still exceeds `max_chars`.
///
/// Greedy packing never produces one, but lines can also come from upstream
/// with their own breaks already applied.
pub(crate) fn rewrap_overlong(lines: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut result = Vec::with_capacity(lines.len());

    for line in lines {
        if char_len(&line) > max_chars && line.split_whitespace().nth(1).is_some() {
            pack_words(line.split_whitespace(), max_chars, &mut result);
        } else {
            result.push(line);
        }
    }

    result
}

// Greedy fill: a word joins the current line only if the line plus a space plus the word still fits
fn pack_words<'a>(words: impl Iterator<Item = &'a str>, max_chars: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_len = 0;

    for word in words {
        let word_len = char_len(word);

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
