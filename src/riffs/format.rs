//! Riff formatting — turns detected bar sequences into display blocks with
//! bar-lines, repeat marks, time signatures and ending brackets.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::BarToken;
use crate::renderer::constants::{BAR_LINE, DEAD_NOTE, STRING_SPACER};
use crate::renderer::text::{block_height, block_width, join_tabs, pad_end, repeat_char};
use crate::sequence::Sequence;

use super::order::{riff_label, RiffOrder};

/// Marks a bar identical to the one before it.
const REPEAT_BAR: char = '%';
const OPEN: &str = "|";
const OPEN_REPEAT: &str = "|:";
const CLOSE_REPEAT: &str = ":|";

/// A riff ready for layout: its heading and the text block of every bar,
/// stem bars first, then the bars of each ending in turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedRiff {
    pub label: String,
    pub bars: Vec<String>,
}

impl FormattedRiff {
    pub fn new(riff_index: usize, bars: Vec<String>) -> Self {
        Self { label: riff_label(riff_index), bars }
    }

    /// Width of all bars side by side.
    pub fn width(&self) -> usize {
        self.bars.iter().map(|b| block_width(b)).sum()
    }
}

/// Where a bar sits inside a riff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BarPosition {
    Stem(usize),
    Ending(usize, usize),
}

/// Format every riff. `order` decides where time signatures must be shown:
/// a bar gets its header whenever, in play order, it changes the metre.
pub fn format_riffs(riffs: &[Sequence<BarToken>], order: &[RiffOrder]) -> Vec<FormattedRiff> {
    let stamped = stamp_time_signatures(riffs, order);
    riffs
        .iter()
        .enumerate()
        .map(|(riff_index, riff)| format_riff(riff_index, riff, &stamped))
        .collect()
}

fn format_riff(
    riff_index: usize,
    riff: &Sequence<BarToken>,
    stamped: &HashSet<(usize, BarPosition)>,
) -> FormattedRiff {
    let stem = riff.stem();
    let endings = riff.endings();

    let compose = |position: BarPosition, token: &BarToken, text: String| -> String {
        let mut parts: Vec<String> = Vec::with_capacity(3);
        if position == BarPosition::Stem(0) {
            let opening = if riff.has_endings() { OPEN_REPEAT } else { OPEN };
            parts.push(opening_block(&text, opening));
        }
        if stamped.contains(&(riff_index, position)) {
            parts.push(token.time_signature.clone());
        }
        parts.push(text);
        join_tabs(&parts)
    };

    let mut bars: Vec<String> = compress_repeats(None, stem)
        .into_iter()
        .zip(stem)
        .enumerate()
        .map(|(j, (text, token))| compose(BarPosition::Stem(j), token, text))
        .collect();

    for (e, ending) in endings.iter().enumerate() {
        let mut ending_bars: Vec<String> = compress_repeats(stem.last(), ending)
            .into_iter()
            .zip(ending)
            .enumerate()
            .map(|(j, (text, token))| compose(BarPosition::Ending(e, j), token, text))
            .collect();

        if e + 1 < endings.len() {
            if let Some(last) = ending_bars.last_mut() {
                *last = close_repeat(last);
            }
        }
        bars.extend(label_ending(e, ending_bars));
    }

    FormattedRiff::new(riff_index, bars)
}

// ─── Repeated bars ──────────────────────────────────────────────────────

/// Replace each bar that repeats the bar before it with a `%` bar.
/// Bars without any played note (rests, sustains) are always written out.
fn compress_repeats(previous: Option<&BarToken>, tokens: &[BarToken]) -> Vec<String> {
    let mut previous = previous;
    tokens
        .iter()
        .map(|token| {
            let text = if previous == Some(token) && has_played_note(&token.bar) {
                repeat_bar(&token.bar)
            } else {
                token.bar.clone()
            };
            previous = Some(token);
            text
        })
        .collect()
}

fn is_note_char(c: char) -> bool {
    c.is_ascii_digit() || c == DEAD_NOTE
}

fn has_played_note(bar: &str) -> bool {
    bar.chars().any(is_note_char)
}

/// Rows that carry strings (as opposed to annotation rows) end in a bar-line.
fn is_content_row(row: &str) -> bool {
    row.ends_with(BAR_LINE)
}

/// A one-column bar with `%` on the strings played first in `bar`.
fn repeat_bar(bar: &str) -> String {
    let rows: Vec<Vec<char>> = bar
        .split('\n')
        .filter(|r| is_content_row(r))
        .map(|r| r.chars().collect())
        .collect();
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);

    let first_column =
        (0..width).find(|&col| rows.iter().any(|r| r.get(col).copied().is_some_and(is_note_char)));
    let marked: Vec<bool> = match first_column {
        Some(col) => rows
            .iter()
            .map(|r| r.get(col).copied().is_some_and(is_note_char))
            .collect(),
        None => (0..rows.len()).map(|i| i == rows.len() / 2).collect(),
    };

    marked
        .into_iter()
        .map(|m| {
            let mark = if m { REPEAT_BAR } else { STRING_SPACER };
            format!("{mark}{BAR_LINE}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ─── Bar-lines and endings ──────────────────────────────────────────────

/// Opening bar-line block matching `bar` row for row.
fn opening_block(bar: &str, opening: &str) -> String {
    let width = opening.chars().count();
    bar.split('\n')
        .map(|row| {
            if is_content_row(row) {
                opening.to_string()
            } else {
                repeat_char(' ', width)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// End a bar with a closing repeat sign.
fn close_repeat(bar: &str) -> String {
    bar.split('\n')
        .map(|row| match row.strip_suffix(BAR_LINE) {
            Some(body) => format!("{body}{CLOSE_REPEAT}"),
            None => format!("{row} "),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Put the `[n.   ]` bracket of ending `ending_index` over its bars.
fn label_ending(ending_index: usize, bars: Vec<String>) -> Vec<String> {
    let height = bars.iter().map(|b| block_height(b)).max().unwrap_or(0);
    let count = bars.len();
    let opening = format!("[{}.", ending_index + 1);

    bars.into_iter()
        .enumerate()
        .map(|(j, bar)| {
            let width = block_width(&bar);
            let fragment = if count == 1 {
                let closed = format!("{opening}]");
                let core_width = width.saturating_sub(1).max(closed.chars().count());
                pad_end(&format!("{}]", pad_end(&opening, core_width - 1, ' ')), width, ' ')
            } else if j == 0 {
                pad_end(&opening, width, ' ')
            } else if j + 1 == count {
                pad_end(&format!("{}]", repeat_char(' ', width.saturating_sub(2))), width, ' ')
            } else {
                repeat_char(' ', width)
            };

            let padding = height - block_height(&bar);
            let mut rows = vec![fragment];
            rows.extend(std::iter::repeat(String::new()).take(padding));
            rows.push(bar);
            rows.join("\n")
        })
        .collect()
}

// ─── Time signatures ────────────────────────────────────────────────────

/// Walk the play order and mark each bar at which the metre changes.
///
/// Every order entry is walked at most twice: the second pass shows
/// whether the riff's start needs its header again after its own end.
fn stamp_time_signatures(
    riffs: &[Sequence<BarToken>],
    order: &[RiffOrder],
) -> HashSet<(usize, BarPosition)> {
    let mut stamped = HashSet::new();
    let mut active: Option<&str> = None;

    for entry in order {
        let RiffOrder::Riff { riff_index, ending_index, times } = *entry else {
            continue;
        };
        let Some(riff) = riffs.get(riff_index) else {
            continue;
        };

        let stem = riff
            .stem()
            .iter()
            .enumerate()
            .map(|(j, token)| (BarPosition::Stem(j), token));
        let ending = ending_index
            .and_then(|e| riff.endings().get(e).map(|bars| (e, bars)))
            .into_iter()
            .flat_map(|(e, bars)| {
                bars.iter()
                    .enumerate()
                    .map(move |(j, token)| (BarPosition::Ending(e, j), token))
            });
        let pass: Vec<(BarPosition, &BarToken)> = stem.chain(ending).collect();

        for _ in 0..times.min(2) {
            for &(position, token) in &pass {
                if active != Some(token.time_signature.as_str()) {
                    stamped.insert((riff_index, position));
                    active = Some(token.time_signature.as_str());
                }
            }
        }
    }

    stamped
}
