//! Line layout — packs formatted riffs into lines of a maximum width.
//!
//! Bars are placed greedily left to right. A riff's label is only shown
//! above the line holding its first bar, and a line is as wide as its widest
//! row: a label longer than the bars under it widens that riff's segment.

use serde::{Deserialize, Serialize};

use crate::model::TabData;
use crate::renderer::full_tab_bars;
use crate::renderer::text::{block_width, join_tabs, text_width};

use super::format::FormattedRiff;
use super::order::{render_order, RiffOrder};

pub const DEFAULT_MAX_LINE_WIDTH: usize = 84;

/// Output options for the riff sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Maximum line width in columns. A single bar wider than this still
    /// gets a line of its own.
    pub max_line_width: usize,
    /// Leave out the tuning column in front of the first line
    pub hide_tuning: bool,
    /// Start a riff on a new line when it would not fit on the current one
    pub avoid_splitting_riffs: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_line_width: DEFAULT_MAX_LINE_WIDTH,
            hide_tuning: false,
            avoid_splitting_riffs: false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Line structures
// ═══════════════════════════════════════════════════════════════════════

/// A run of bars that belong together (usually a riff).
struct Group<'a> {
    label: Option<&'a str>,
    bars: &'a [String],
}

impl Group<'_> {
    fn label_width(&self) -> usize {
        self.label.map(text_width).unwrap_or(0)
    }

    fn width(&self) -> usize {
        self.bars.iter().map(|b| block_width(b)).sum()
    }
}

/// The part of a group that landed on one line.
struct Segment {
    group: usize,
    /// Whether the group's label is shown above this segment
    labelled: bool,
    bars: Vec<usize>,
}

#[derive(Default)]
struct Line {
    segments: Vec<Segment>,
}

impl Line {
    fn has_bars(&self) -> bool {
        self.segments.iter().any(|s| !s.bars.is_empty())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Render riffs into lines no wider than `options.max_line_width`, followed
/// by the order summary.
pub fn render_riffs(
    tuning: &str,
    riffs: &[FormattedRiff],
    order: &[RiffOrder],
    options: &RenderOptions,
) -> String {
    let mut text = render_groups(tuning, &riff_groups(riffs), options);
    text.push_str("\n\n");
    text.push_str(&render_order(order));
    text
}

/// The uncompressed tab: every bar in play order, packed into lines.
pub fn render_full_tab(tab: &TabData, options: &RenderOptions) -> String {
    let bars = full_tab_bars(tab);
    let groups = [Group { label: None, bars: &bars }];
    render_groups(&tab.tuning, &groups, options)
}

/// Width of the widest line in rendered text.
pub fn max_line_width(rendered: &str) -> usize {
    rendered.lines().map(text_width).max().unwrap_or(0)
}

/// The narrowest width the riffs can be rendered at: the widest line when
/// every bar gets a line of its own. The order summary is not counted.
pub fn minimum_line_width(tuning: &str, riffs: &[FormattedRiff], options: &RenderOptions) -> usize {
    let narrowest = RenderOptions { max_line_width: 1, ..options.clone() };
    max_line_width(&render_groups(tuning, &riff_groups(riffs), &narrowest))
}

fn riff_groups(riffs: &[FormattedRiff]) -> Vec<Group<'_>> {
    riffs
        .iter()
        .map(|riff| Group { label: Some(riff.label.as_str()), bars: &riff.bars })
        .collect()
}

// ─── Packing ────────────────────────────────────────────────────────────

fn render_groups(tuning: &str, groups: &[Group], options: &RenderOptions) -> String {
    let tuning_width = if options.hide_tuning { 0 } else { block_width(tuning) };
    let lines = pack_lines(groups, tuning_width, options);

    lines
        .iter()
        .enumerate()
        .map(|(line_index, line)| {
            let mut blocks: Vec<String> = Vec::with_capacity(line.segments.len() + 1);
            if line_index == 0 && !options.hide_tuning {
                blocks.push(tuning.to_string());
            }
            for segment in &line.segments {
                let group = &groups[segment.group];
                let bars: Vec<&str> =
                    segment.bars.iter().map(|&b| group.bars[b].as_str()).collect();
                let joined = join_tabs(&bars);
                match group.label {
                    Some(label) if segment.labelled => blocks.push(format!("{label}\n{joined}")),
                    _ => blocks.push(joined),
                }
            }
            join_tabs(&blocks)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn pack_lines(groups: &[Group], tuning_width: usize, options: &RenderOptions) -> Vec<Line> {
    let max = options.max_line_width;
    let mut lines = vec![Line::default()];

    for (group_index, group) in groups.iter().enumerate() {
        for bar_index in 0..group.bars.len() {
            let line = &lines[lines.len() - 1];
            let tuning = if lines.len() == 1 { tuning_width } else { 0 };

            let moves_whole_group = bar_index == 0
                && options.avoid_splitting_riffs
                && line.has_bars()
                && tuning + line_width(line, groups) + group.width().max(group.label_width()) > max;
            let overflows = line.has_bars()
                && tuning + line_width_with(line, groups, group_index, bar_index) > max;

            if moves_whole_group || overflows {
                lines.push(Line::default());
            }
            let last = lines.len() - 1;
            place(&mut lines[last], group_index, bar_index);
        }
    }

    lines
}

fn place(line: &mut Line, group: usize, bar: usize) {
    match line.segments.last_mut() {
        Some(segment) if segment.group == group => segment.bars.push(bar),
        _ => line.segments.push(Segment { group, labelled: bar == 0, bars: vec![bar] }),
    }
}

fn segment_width(segment: &Segment, groups: &[Group]) -> usize {
    let group = &groups[segment.group];
    let bars: usize = segment.bars.iter().map(|&b| block_width(&group.bars[b])).sum();
    let label = if segment.labelled { group.label_width() } else { 0 };
    bars.max(label)
}

/// Width of `line` without the tuning column.
fn line_width(line: &Line, groups: &[Group]) -> usize {
    line.segments.iter().map(|s| segment_width(s, groups)).sum()
}

/// Width of `line` (without tuning) once bar `bar` of `group` is added.
fn line_width_with(line: &Line, groups: &[Group], group: usize, bar: usize) -> usize {
    let extends_last = line.segments.last().is_some_and(|s| s.group == group);
    let mut width = 0;
    for (i, segment) in line.segments.iter().enumerate() {
        if extends_last && i + 1 == line.segments.len() {
            let mut extended_bars = segment.bars.clone();
            extended_bars.push(bar);
            let extended = Segment { group, labelled: segment.labelled, bars: extended_bars };
            width += segment_width(&extended, groups);
        } else {
            width += segment_width(segment, groups);
        }
    }
    if !extends_last {
        let added = Segment { group, labelled: bar == 0, bars: vec![bar] };
        width += segment_width(&added, groups);
    }
    width
}
