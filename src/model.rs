//! Data model for a single guitar track and its rendered tab.
//!
//! `TrackData` is the structured input (bars of notes with rational timing);
//! `TabData` is what the renderer produces from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabError};
use crate::note_time::{self, NoteTime};

/// A whole track: string names and the bars to play, in play order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    /// Track name (usually the instrument)
    #[serde(default)]
    pub name: String,
    /// String names from top (highest) to bottom
    pub string_names: Vec<String>,
    /// Bars in play order, repeats already expanded
    pub bars: Vec<Bar>,
}

/// One bar of notes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bar {
    /// Time signature; set on the first bar and then only where it changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<TimeSignature>,
    /// Notes with absolute start times inside the bar
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Time signature, e.g. 6/8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u32, u32)", into = "(u32, u32)")]
pub struct TimeSignature {
    /// Beats per bar (6 in 6/8)
    pub numerator: u32,
    /// Beat unit (8 in 6/8)
    pub denominator: u32,
}

impl TimeSignature {
    pub fn new(numerator: u32, denominator: u32) -> Result<Self> {
        if denominator == 0 {
            return Err(TabError::Validation(format!(
                "time signature {numerator}/{denominator} has a zero denominator"
            )));
        }
        Ok(Self { numerator, denominator })
    }
}

impl TryFrom<(u32, u32)> for TimeSignature {
    type Error = TabError;

    fn try_from((numerator, denominator): (u32, u32)) -> Result<Self> {
        TimeSignature::new(numerator, denominator)
    }
}

impl From<TimeSignature> for (u32, u32) {
    fn from(ts: TimeSignature) -> Self {
        (ts.numerator, ts.denominator)
    }
}

/// A single fretted note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Start position inside the bar
    pub start: NoteTime,
    pub duration: NoteTime,
    /// String index, 0 = top string
    pub string: usize,
    pub fret: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<NoteModifier>,
}

impl Note {
    pub fn new(start: NoteTime, duration: NoteTime, string: usize, fret: u32) -> Self {
        Self { start, duration, string, fret, modifier: None }
    }

    pub fn with_modifier(mut self, modifier: NoteModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Whether this note is sounding at `now` (start inclusive, end exclusive).
    pub fn is_sounding(&self, now: NoteTime) -> bool {
        note_time::is_sounding(self.start, self.duration, now)
    }
}

/// Articulation attached to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteModifier {
    HammerOn,
    PullOff,
    SlideUp,
    SlideDown,
    Staccato,
    /// Continuation of the previous note; rendered as sustain
    Tie,
    /// Muted (dead) note
    Dead,
}

/// A rendered track: one text block per bar plus headers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TabData {
    /// String names column, e.g. `"E|\nB|\n..."`
    pub tuning: String,
    /// Time-signature header per bar index, only where the signature changes
    pub time_signatures: BTreeMap<usize, String>,
    /// Multi-line text of each bar
    pub bars: Vec<String>,
}

/// A rendered bar paired with the time-signature header in force at that bar.
///
/// This is the unit the sequence detector compares: two bars only count as
/// the same riff bar when both the notes and the metre match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarToken {
    pub bar: String,
    pub time_signature: String,
}

impl BarToken {
    pub fn new(bar: impl Into<String>, time_signature: impl Into<String>) -> Self {
        Self { bar: bar.into(), time_signature: time_signature.into() }
    }
}

impl TabData {
    /// Every bar with the time-signature header active at its position.
    pub fn bar_tokens(&self) -> Vec<BarToken> {
        let mut active = String::new();
        self.bars
            .iter()
            .enumerate()
            .map(|(i, bar)| {
                if let Some(ts) = self.time_signatures.get(&i) {
                    active = ts.clone();
                }
                BarToken::new(bar.clone(), active.clone())
            })
            .collect()
    }
}
