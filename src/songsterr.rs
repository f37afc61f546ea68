//! Songsterr importer — converts a Songsterr track JSON payload into `TrackData`.
//!
//! Only the first voice of each measure is used. Repeats and alternate
//! endings are expanded (see [`crate::unroller`]) so the resulting bars are in
//! play order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TabError};
use crate::model::{Bar, Note, NoteModifier, TimeSignature, TrackData};
use crate::note_time::NoteTime;
use crate::unroller::unroll;

const NOTE_NAMES: [&str; 12] = ["C", "C♯", "D", "E♭", "E", "F", "F♯", "G", "G♯", "A", "B♭", "B"];

// ═══════════════════════════════════════════════════════════════════════
// Payload model
// ═══════════════════════════════════════════════════════════════════════

/// A Songsterr track. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongsterrData {
    /// MIDI note of each open string, top string first
    #[serde(default)]
    pub tuning: Option<Vec<i32>>,
    #[serde(default)]
    pub instrument: String,
    #[serde(default)]
    pub measures: Vec<SongsterrMeasure>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongsterrMeasure {
    #[serde(default)]
    pub signature: Option<TimeSignature>,
    #[serde(default)]
    pub voices: Vec<SongsterrVoice>,
    /// This measure opens a repeated section
    #[serde(default)]
    pub repeat_start: bool,
    /// This measure closes a repeated section played this many times
    #[serde(default)]
    pub repeat: Option<u32>,
    /// Endings (1-based) this measure is played in
    #[serde(default)]
    pub alternate_ending: Option<Vec<u32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongsterrVoice {
    #[serde(default)]
    pub beats: Vec<SongsterrBeat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongsterrBeat {
    #[serde(default)]
    pub notes: Vec<SongsterrNote>,
    pub duration: NoteTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongsterrNote {
    #[serde(default)]
    pub rest: bool,
    pub string: Option<usize>,
    pub fret: Option<u32>,
    #[serde(default)]
    pub tie: bool,
    #[serde(default)]
    pub dead: bool,
    /// Hammer-on or pull-off into the next note on this string
    pub hp: Option<bool>,
    /// Slide into the next note on this string (`"legato"`, `"shift"`, ...)
    pub slide: Option<String>,
    #[serde(default)]
    pub staccato: bool,
}

impl SongsterrData {
    /// A payload is usable when it has a tuning and at least one measure.
    pub fn is_valid(&self) -> bool {
        self.tuning.as_ref().is_some_and(|t| !t.is_empty()) && !self.measures.is_empty()
    }
}

impl SongsterrMeasure {
    fn beats(&self) -> &[SongsterrBeat] {
        self.voices.first().map(|v| v.beats.as_slice()).unwrap_or(&[])
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

pub fn parse_songsterr_json(json: &str) -> Result<SongsterrData> {
    Ok(serde_json::from_str(json)?)
}

/// Name of the pitch class of a MIDI note (`64` → `E`).
pub fn note_name(midi_note: i32) -> &'static str {
    NOTE_NAMES[midi_note.rem_euclid(12) as usize]
}

/// Convert a Songsterr payload into bars of notes in play order.
pub fn to_track_data(data: &SongsterrData) -> Result<TrackData> {
    let tuning = match &data.tuning {
        Some(tuning) if data.is_valid() => tuning,
        _ => {
            return Err(TabError::Validation(
                "Songsterr data needs a tuning and at least one measure".into(),
            ))
        }
    };

    let measure_bars = data
        .measures
        .iter()
        .enumerate()
        .map(|(index, measure)| convert_measure(data, index, measure))
        .collect::<Result<Vec<Bar>>>()?;

    let play_order = unroll(data);
    let bars: Vec<Bar> = play_order
        .iter()
        .map(|m| measure_bars[m.original_index].clone())
        .collect();

    debug!(
        instrument = %data.instrument,
        measures = data.measures.len(),
        bars = bars.len(),
        "converted Songsterr track"
    );

    Ok(TrackData {
        name: data.instrument.clone(),
        string_names: tuning.iter().map(|&n| note_name(n).to_string()).collect(),
        bars,
    })
}

// ─── Measures ───────────────────────────────────────────────────────────

fn convert_measure(data: &SongsterrData, index: usize, measure: &SongsterrMeasure) -> Result<Bar> {
    let beats = measure.beats();
    let mut notes = Vec::new();
    let mut start = NoteTime::ZERO;

    for (beat_index, beat) in beats.iter().enumerate() {
        // hammer-ons, pull-offs and slides are marked on the note they start from
        let previous_beat = match beat_index.checked_sub(1) {
            Some(prev) => beats.get(prev),
            None => index
                .checked_sub(1)
                .and_then(|prev| data.measures[prev].beats().last()),
        };

        for source in beat.notes.iter().filter(|n| !n.rest) {
            let string = source.string.ok_or_else(|| {
                TabError::Validation(format!("measure {}: note has no string", index + 1))
            })?;
            let fret = source.fret.ok_or_else(|| {
                TabError::Validation(format!("measure {}: note has no fret", index + 1))
            })?;

            let from_previous = previous_beat
                .and_then(|b| b.notes.iter().find(|n| !n.rest && n.string == Some(string)))
                .and_then(|prev| transition(prev, fret));
            let modifier = from_previous.or_else(|| own_modifier(source));

            notes.push(Note {
                start,
                duration: beat.duration,
                string,
                fret,
                modifier,
            });
        }

        start = start.checked_add(beat.duration)?;
    }

    Ok(Bar { time_signature: measure.signature, notes })
}

/// Legato modifier carried over from the previous note on the same string.
fn transition(previous: &SongsterrNote, fret: u32) -> Option<NoteModifier> {
    let from = previous.fret?;
    let rising = from <= fret;
    if previous.hp.is_some() {
        Some(if rising { NoteModifier::HammerOn } else { NoteModifier::PullOff })
    } else if previous.slide.is_some() {
        Some(if rising { NoteModifier::SlideUp } else { NoteModifier::SlideDown })
    } else {
        None
    }
}

fn own_modifier(note: &SongsterrNote) -> Option<NoteModifier> {
    if note.staccato {
        Some(NoteModifier::Staccato)
    } else if note.tie {
        Some(NoteModifier::Tie)
    } else if note.dead {
        Some(NoteModifier::Dead)
    } else {
        None
    }
}
