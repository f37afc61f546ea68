//! Glyph table and fixed values for the text tab renderer.

// ── Grid ────────────────────────────────────────────────────────────
pub(crate) const STRING_SPACER: char = '-';
pub(crate) const ANNOTATION_SPACER: char = ' ';
pub(crate) const BAR_LINE: char = '|';
pub(crate) const ANNOTATION_BAR_LINE: char = ' ';
pub(crate) const SUSTAIN: char = '~';

// ── Note text ───────────────────────────────────────────────────────
pub(crate) const DEAD_NOTE: char = '×';
/// Frets at or above this need two columns.
pub(crate) const DOUBLE_WIDTH_FRET: u32 = 10;
/// Most grid ticks a single bar may need.
pub(crate) const MAX_BAR_TICKS: usize = 1 << 16;

// ── Modifier glyphs (shown on the row above the note) ───────────────
pub(crate) const HAMMER_ON: char = 'h';
pub(crate) const PULL_OFF: char = 'p';
pub(crate) const SLIDE_UP: char = '/';
pub(crate) const SLIDE_DOWN: char = '\\';
pub(crate) const STACCATO: char = '.';
/// Pads a glyph on its left (and opens a double-width bracket).
pub(crate) const BRACKET_LEFT: char = '⌐';
/// Pads a glyph on its right (and closes a double-width bracket).
pub(crate) const BRACKET_RIGHT: char = '¬';

// ── Repeated quavers ────────────────────────────────────────────────
pub(crate) const REPEAT_ONCE: char = '’';
pub(crate) const REPEAT_RUN: char = '”';
/// Grid unit at which repeated notes are compressed.
pub(crate) const QUAVER_UNIT: i64 = 8;
/// Shortest run that is worth collapsing into a single `”`.
pub(crate) const MIN_REPEAT_THRESHOLD: i64 = 2;

// ── Headers ─────────────────────────────────────────────────────────
pub(crate) const HEADER_SEPARATOR: char = ':';
pub(crate) const TUNING_SEPARATOR: char = '|';
