//! Helpers for multi-line, fixed-width text blocks.
//!
//! Widths are counted in `char`s: the glyph table uses several non-ASCII
//! symbols, each of which occupies one column.

/// Number of columns a single line occupies.
pub fn text_width(line: &str) -> usize {
    line.chars().count()
}

/// Width of the widest line in a block.
pub fn block_width(block: &str) -> usize {
    block.split('\n').map(text_width).max().unwrap_or(0)
}

/// Number of rows in a block (an empty block still has one row).
pub fn block_height(block: &str) -> usize {
    block.split('\n').count()
}

pub fn pad_start(text: &str, width: usize, fill: char) -> String {
    let len = text_width(text);
    if len >= width {
        return text.to_string();
    }
    let mut out: String = std::iter::repeat(fill).take(width - len).collect();
    out.push_str(text);
    out
}

pub fn pad_end(text: &str, width: usize, fill: char) -> String {
    let len = text_width(text);
    let mut out = text.to_string();
    out.extend(std::iter::repeat(fill).take(width.saturating_sub(len)));
    out
}

pub fn repeat_char(c: char, count: usize) -> String {
    std::iter::repeat(c).take(count).collect()
}

/// Keep the first `len` columns of a line.
pub(crate) fn truncate_chars(line: &mut String, len: usize) {
    if let Some((byte_idx, _)) = line.char_indices().nth(len) {
        line.truncate(byte_idx);
    }
}

/// Join text blocks side by side.
///
/// Blocks are bottom-aligned: a shorter block is padded with blank rows on
/// top. Every row of a block is padded on the right to that block's widest
/// row so the following block starts in the same column on every row.
pub fn join_tabs<S: AsRef<str>>(blocks: &[S]) -> String {
    let height = blocks
        .iter()
        .map(|b| block_height(b.as_ref()))
        .max()
        .unwrap_or(0);

    let mut rows = vec![String::new(); height];
    for block in blocks {
        let block = block.as_ref();
        let width = block_width(block);
        let lines: Vec<&str> = block.split('\n').collect();
        let offset = height - lines.len();
        for (row_idx, row) in rows.iter_mut().enumerate() {
            let line = if row_idx < offset { "" } else { lines[row_idx - offset] };
            row.push_str(&pad_end(line, width, ' '));
        }
    }
    rows.join("\n")
}
