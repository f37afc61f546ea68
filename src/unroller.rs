//! Unroll a Songsterr track by expanding repeats and alternate endings into
//! a linear measure sequence.
//!
//! Handles:
//! - `repeatStart` / `repeat` sections played N times
//! - Alternate endings, where a measure is tagged with the passes it is
//!   played on and the last ending carries the total pass count
//!
//! A closing `repeat` without an open section is played once.

use crate::songsterr::SongsterrData;

/// One entry in the unrolled (play-order) sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnrolledMeasure {
    /// Index into `SongsterrData.measures`
    pub original_index: usize,
}

/// Unroll the track's measures into play order.
pub fn unroll(data: &SongsterrData) -> Vec<UnrolledMeasure> {
    let mut result: Vec<UnrolledMeasure> = Vec::with_capacity(data.measures.len());
    // Both are positions in `result`, not measure indexes.
    let mut section_start: Option<usize> = None;
    let mut section_end: Option<usize> = None;

    for (index, measure) in data.measures.iter().enumerate() {
        let this = UnrolledMeasure { original_index: index };

        if measure.repeat_start {
            section_start = Some(result.len());
        }

        let endings = measure.alternate_ending.as_deref().unwrap_or(&[]);
        let repeats = measure.repeat.unwrap_or(0);

        let Some(start) = section_start.filter(|_| repeats > 1 || !endings.is_empty()) else {
            result.push(this);
            continue;
        };

        if !endings.is_empty() {
            // The section body stops where the first ending begins.
            let end = *section_end.get_or_insert(result.len());
            let body: Vec<UnrolledMeasure> = result[start..end].to_vec();

            for &ending in endings {
                result.push(this);
                if measure.repeat != Some(ending) {
                    result.extend_from_slice(&body);
                }
            }

            if measure.repeat.is_some() {
                section_start = None;
                section_end = None;
            }
        } else {
            result.push(this);
            let body: Vec<UnrolledMeasure> = result[start..].to_vec();
            for _ in 1..repeats {
                result.extend_from_slice(&body);
            }
            section_start = None;
        }
    }

    result
}
