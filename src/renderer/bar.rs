//! Per-bar grid rendering.
//!
//! A bar is laid out on a grid of ticks, one tick per subdivision unit (the
//! lcm of the note duration denominators). Each tick is as wide as the widest
//! fret number starting on it. Rows are built column by column; a row shows,
//! in order of precedence: its own note, the modifier glyph of the note on the
//! string below, a sustain while its last note still sounds, or a spacer.

use tracing::warn;

use crate::error::{Result, TabError};
use crate::model::{Bar, Note, NoteModifier, TimeSignature};
use crate::note_time::{self, NoteTime};

use super::constants::*;
use super::text::{pad_end, pad_start, repeat_char, text_width, truncate_chars};

/// Identity of a note for repeat detection.
type NoteKey = (usize, u32, Option<NoteModifier>, NoteTime);

/// One output row of a bar.
struct Row {
    /// String whose notes this row shows (`None` for the annotation row)
    own: Option<usize>,
    /// String whose modifier glyphs are promoted into this row
    below: Option<usize>,
    spacer: char,
    bar_line: char,
    text: String,
}

/// Render one bar into a multi-line text block.
pub(super) fn render_bar(
    bar: &Bar,
    time_signature: TimeSignature,
    string_count: usize,
    bar_index: usize,
) -> Result<String> {
    let denominators: Vec<i64> = bar.notes.iter().map(|n| n.duration.denominator()).collect();
    let unit = note_time::lcm(&denominators)?;
    let ticks = tick_count(unit, time_signature)?;

    // ── Place notes on the grid ─────────────────────────────────────
    let mut starts: Vec<Vec<&Note>> = vec![Vec::new(); ticks];
    for note in &bar.notes {
        if note.string >= string_count {
            warn!(bar = bar_index, string = note.string, "note on unknown string skipped");
            continue;
        }
        match tick_of(note.start, unit) {
            Some(tick) if tick < ticks => starts[tick].push(note),
            _ => warn!(
                bar = bar_index,
                start = %note.start,
                unit,
                "note does not start on the bar grid, skipped"
            ),
        }
    }

    let tick_widths: Vec<usize> = starts
        .iter()
        .map(|notes| notes.iter().map(|n| note_width(n)).max().unwrap_or(1))
        .collect();

    let has_annotation = bar
        .notes
        .iter()
        .filter(|n| n.string == 0)
        .any(|n| modifier_glyph(n).is_some() || note_width(n) > 1);

    let mut rows = Vec::with_capacity(string_count + 1);
    if has_annotation {
        rows.push(Row {
            own: None,
            below: Some(0),
            spacer: ANNOTATION_SPACER,
            bar_line: ANNOTATION_BAR_LINE,
            text: String::new(),
        });
    }
    for string in 0..string_count {
        rows.push(Row {
            own: Some(string),
            below: (string + 1 < string_count).then_some(string + 1),
            spacer: STRING_SPACER,
            bar_line: BAR_LINE,
            text: String::new(),
        });
    }

    // ── Walk the ticks ──────────────────────────────────────────────
    let threshold = repeat_threshold(time_signature);
    let mut last_started: Vec<Option<&Note>> = vec![None; string_count];
    let mut previous_key: Vec<NoteKey> = Vec::new();
    let mut run: i64 = 0;

    for (tick, notes) in starts.iter().enumerate() {
        let width = tick_widths[tick];
        let now = NoteTime::new(tick as i64, unit)?;
        let key = note_keys(notes);

        let is_repeat = unit == QUAVER_UNIT
            && tick > 0
            && !notes.is_empty()
            && notes.iter().all(|n| is_quaver(n))
            && key == previous_key;
        run = if is_repeat { run + 1 } else { 0 };

        if is_repeat {
            match threshold {
                Some(t) if run == t => {
                    for row in rows.iter_mut() {
                        let keep = text_width(&row.text) + 1 - run as usize;
                        truncate_chars(&mut row.text, keep);
                        let has_note = starting_on(notes, row.own).is_some();
                        row.text.push(if has_note { REPEAT_RUN } else { row.spacer });
                    }
                }
                Some(t) if run > t => {}
                _ => {
                    for row in rows.iter_mut() {
                        let has_note = starting_on(notes, row.own).is_some();
                        row.text.push(if has_note { REPEAT_ONCE } else { row.spacer });
                    }
                }
            }
        } else {
            for row in rows.iter_mut() {
                let cell = render_cell(row, notes, &last_started, now, width);
                row.text.push_str(&cell);
            }
        }

        for note in notes {
            last_started[note.string] = Some(*note);
        }
        previous_key = key;
    }

    let lines: Vec<String> = rows
        .into_iter()
        .map(|mut row| {
            row.text.push(row.bar_line);
            row.text
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Text of one row at one tick, when the tick is not a repeat.
fn render_cell(
    row: &Row,
    notes: &[&Note],
    last_started: &[Option<&Note>],
    now: NoteTime,
    width: usize,
) -> String {
    if let Some(note) = starting_on(notes, row.own) {
        return note_text(note, width);
    }
    if let Some(promoted) = starting_on(notes, row.below).and_then(|n| promoted_text(n, width)) {
        return pad_end(&promoted, width, row.spacer);
    }
    let sounding = row
        .own
        .and_then(|s| last_started[s])
        .is_some_and(|n| n.is_sounding(now));
    if sounding {
        return repeat_char(SUSTAIN, width);
    }
    repeat_char(row.spacer, width)
}

fn starting_on<'a>(notes: &[&'a Note], string: Option<usize>) -> Option<&'a Note> {
    let string = string?;
    notes.iter().copied().find(|n| n.string == string)
}

fn note_text(note: &Note, width: usize) -> String {
    match note.modifier {
        Some(NoteModifier::Tie) => repeat_char(SUSTAIN, width),
        Some(NoteModifier::Dead) => pad_start(&DEAD_NOTE.to_string(), width, STRING_SPACER),
        _ => pad_start(&note.fret.to_string(), width, STRING_SPACER),
    }
}

/// Glyph shown above a note: its modifier, or a bracket marking a
/// double-width fret.
fn promoted_text(note: &Note, width: usize) -> Option<String> {
    match modifier_glyph(note) {
        Some(glyph @ (HAMMER_ON | PULL_OFF | SLIDE_UP)) => {
            Some(pad_end(&glyph.to_string(), width, BRACKET_RIGHT))
        }
        Some(glyph) => Some(pad_start(&glyph.to_string(), width, BRACKET_LEFT)),
        None if note.modifier.is_none() && note_width(note) > 1 => {
            Some(pad_end(&BRACKET_LEFT.to_string(), width, BRACKET_RIGHT))
        }
        None => None,
    }
}

fn modifier_glyph(note: &Note) -> Option<char> {
    match note.modifier? {
        NoteModifier::HammerOn => Some(HAMMER_ON),
        NoteModifier::PullOff => Some(PULL_OFF),
        NoteModifier::SlideUp => Some(SLIDE_UP),
        NoteModifier::SlideDown => Some(SLIDE_DOWN),
        NoteModifier::Staccato => Some(STACCATO),
        NoteModifier::Tie | NoteModifier::Dead => None,
    }
}

/// Columns a note needs. Ties are drawn as sustain and never widen a tick.
fn note_width(note: &Note) -> usize {
    match note.modifier {
        Some(NoteModifier::Tie) => 1,
        _ if note.fret >= DOUBLE_WIDTH_FRET => note.fret.to_string().len(),
        _ => 1,
    }
}

fn is_quaver(note: &Note) -> bool {
    let duration = note_time::simplify(note.duration);
    duration.numerator() == 1 && duration.denominator() == QUAVER_UNIT
}

fn note_keys(notes: &[&Note]) -> Vec<NoteKey> {
    let mut keys: Vec<NoteKey> = notes
        .iter()
        .map(|n| (n.string, n.fret, n.modifier, note_time::simplify(n.duration)))
        .collect();
    keys.sort_by_key(|k| (k.0, k.1));
    keys
}

/// Grid index of a start time, if it falls exactly on the grid.
fn tick_of(start: NoteTime, unit: i64) -> Option<usize> {
    let scaled = (start.numerator() as i128) * (unit as i128);
    let denominator = start.denominator() as i128;
    if scaled < 0 || scaled % denominator != 0 {
        return None;
    }
    usize::try_from(scaled / denominator).ok()
}

/// Number of grid ticks in a bar: `ceil(unit * num / den)`, at least one and
/// at most `MAX_BAR_TICKS`.
fn tick_count(unit: i64, time_signature: TimeSignature) -> Result<usize> {
    let numerator = (unit as i128) * (time_signature.numerator as i128);
    let denominator = time_signature.denominator as i128;
    let ticks = ((numerator + denominator - 1) / denominator).max(1);
    usize::try_from(ticks)
        .ok()
        .filter(|&t| t <= MAX_BAR_TICKS)
        .ok_or_else(|| {
            TabError::Arithmetic(format!(
                "bar of {ticks} ticks exceeds the limit of {MAX_BAR_TICKS}"
            ))
        })
}

/// Repeats in a run that collapse into a single `”`, when the bar length in
/// crotchets is a whole number large enough to make it worthwhile.
fn repeat_threshold(time_signature: TimeSignature) -> Option<i64> {
    let crotchets = time_signature.numerator as i64 * 4;
    let denominator = time_signature.denominator as i64;
    if crotchets % denominator != 0 {
        return None;
    }
    let threshold = crotchets / denominator - 1;
    (threshold >= MIN_REPEAT_THRESHOLD).then_some(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(n: i64, d: i64) -> NoteTime {
        NoteTime::new(n, d).unwrap()
    }

    fn ts(n: u32, d: u32) -> TimeSignature {
        TimeSignature::new(n, d).unwrap()
    }

    #[test]
    fn empty_bar_has_one_tick() {
        let bar = Bar::default();
        assert_eq!(render_bar(&bar, ts(3, 16), 1, 0).unwrap(), "-|");
    }

    #[test]
    fn oversized_grid_is_an_error() {
        let bar = Bar {
            time_signature: Some(ts(4, 4)),
            notes: vec![Note::new(t(0, 1), t(1, 2_000_000_000), 0, 3)],
        };
        let err = render_bar(&bar, ts(4, 4), 1, 0).unwrap_err();
        assert!(matches!(err, TabError::Arithmetic(_)), "got {err:?}");
    }

    #[test]
    fn largest_grid_still_renders() {
        let bar = Bar {
            time_signature: Some(ts(1, 1)),
            notes: vec![Note::new(t(0, 1), t(1, MAX_BAR_TICKS as i64), 0, 3)],
        };
        let text = render_bar(&bar, ts(1, 1), 1, 0).unwrap();
        assert_eq!(text.chars().count(), MAX_BAR_TICKS + 1);
    }

    #[test]
    fn thresholds_follow_bar_length() {
        assert_eq!(repeat_threshold(ts(4, 4)), Some(3));
        assert_eq!(repeat_threshold(ts(6, 8)), Some(2));
        assert_eq!(repeat_threshold(ts(2, 4)), None);
        assert_eq!(repeat_threshold(ts(7, 8)), None);
    }

    #[test]
    fn off_grid_notes_are_skipped() {
        let bar = Bar {
            time_signature: Some(ts(1, 4)),
            notes: vec![
                Note::new(t(0, 1), t(1, 8), 0, 3),
                Note::new(t(1, 16), t(1, 8), 0, 5),
            ],
        };
        assert_eq!(render_bar(&bar, ts(1, 4), 1, 0).unwrap(), "3-|");
    }

    #[test]
    fn dead_notes_render_as_cross() {
        let bar = Bar {
            time_signature: Some(ts(1, 4)),
            notes: vec![Note::new(t(0, 1), t(1, 4), 1, 3).with_modifier(NoteModifier::Dead)],
        };
        assert_eq!(render_bar(&bar, ts(1, 4), 2, 0).unwrap(), "-|\n×|");
    }
}
