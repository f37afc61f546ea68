//! Sequence detection — finds the repeating patterns in a token stream.
//!
//! The detector looks for a small set of patterns (riffs) that, played in the
//! order it also returns, reproduces the input exactly. Patterns that share
//! all but their last item are merged into a stem with alternative endings.
//!
//! Passes, in order:
//! 1. windowing: every window of `WINDOW` items becomes a candidate
//! 2. dominance: occurrences overlapped by a more common candidate are dropped
//! 3. truncation: candidates overlapping the next occurrence are shortened
//! 4. folding: candidates made of one repeated chunk become that chunk
//! 5. endings: candidates differing only in their last item are merged
//! 6. concatenation: a candidate always followed by another absorbs it
//! 7. order: the input is walked to record which candidate plays when
//!
//! Candidates live in an arena and are never moved; `order` holds the arena
//! indexes of the live candidates in their current iteration order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TabError};

/// Window length used to seed candidates.
pub const WINDOW: usize = 4;

/// Items in an ending.
const ENDING_SIZE: usize = 1;

/// A detected pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sequence<T> {
    /// Played the same way every time
    Stem(Vec<T>),
    /// A shared stem followed by one of several endings
    WithEndings { stem: Vec<T>, endings: Vec<Vec<T>> },
}

impl<T> Sequence<T> {
    pub fn stem(&self) -> &[T] {
        match self {
            Sequence::Stem(items) => items,
            Sequence::WithEndings { stem, .. } => stem,
        }
    }

    pub fn endings(&self) -> &[Vec<T>] {
        match self {
            Sequence::Stem(_) => &[],
            Sequence::WithEndings { endings, .. } => endings,
        }
    }

    pub fn has_endings(&self) -> bool {
        matches!(self, Sequence::WithEndings { .. })
    }

    /// Items played for one pass with the given ending.
    pub fn play(&self, ending: Option<usize>) -> impl Iterator<Item = &T> {
        let ending_items: &[T] = ending
            .and_then(|e| self.endings().get(e))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        self.stem().iter().chain(ending_items.iter())
    }
}

/// One step of the play order: a sequence (with an ending, if it has
/// endings) played `times` times in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub sequence_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ending_index: Option<usize>,
    pub times: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceData<T> {
    pub sequences: Vec<Sequence<T>>,
    pub order: Vec<OrderEntry>,
}

impl<T: Clone> SequenceData<T> {
    /// Expand the order back into the flat item list.
    ///
    /// Fails with `TabError::Validation` when an entry names a sequence or
    /// ending that does not exist.
    pub fn expand(&self) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for (position, entry) in self.order.iter().enumerate() {
            let sequence = self.sequences.get(entry.sequence_index).ok_or_else(|| {
                TabError::Validation(format!(
                    "order entry {position} refers to missing sequence {}",
                    entry.sequence_index
                ))
            })?;
            if let Some(ending) = entry.ending_index {
                if ending >= sequence.endings().len() {
                    return Err(TabError::Validation(format!(
                        "order entry {position} refers to missing ending {ending} of sequence {}",
                        entry.sequence_index
                    )));
                }
            }
            for _ in 0..entry.times {
                out.extend(sequence.play(entry.ending_index).cloned());
            }
        }
        Ok(out)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Candidate arena
// ═══════════════════════════════════════════════════════════════════════

struct Ending<T> {
    items: Vec<T>,
    offsets: Vec<usize>,
}

struct Candidate<T> {
    items: Vec<T>,
    /// Sorted input offsets where this candidate starts
    offsets: Vec<usize>,
    endings: Option<Vec<Ending<T>>>,
}

struct Arena<T> {
    candidates: Vec<Candidate<T>>,
    /// Live candidates, in iteration order
    order: Vec<usize>,
}

impl<T: Clone + PartialEq> Arena<T> {
    fn new() -> Self {
        Self { candidates: Vec::new(), order: Vec::new() }
    }

    fn push(&mut self, items: Vec<T>, offsets: Vec<usize>) {
        self.candidates.push(Candidate { items, offsets, endings: None });
        self.order.push(self.candidates.len() - 1);
    }

    /// First live candidate (in iteration order) with exactly these items.
    fn find_by_items(&self, items: &[T]) -> Option<usize> {
        self.order
            .iter()
            .copied()
            .find(|&id| self.candidates[id].items == items)
    }

    fn sort_by_count(&mut self) {
        let candidates = &self.candidates;
        self.order
            .sort_by(|&a, &b| candidates[b].offsets.len().cmp(&candidates[a].offsets.len()));
    }

    fn sort_by_first_offset(&mut self) {
        let candidates = &self.candidates;
        self.order
            .sort_by_key(|&id| candidates[id].offsets.first().copied().unwrap_or(usize::MAX));
    }
}

fn insert_sorted(offsets: &mut Vec<usize>, offset: usize) {
    let pos = offsets.partition_point(|&o| o < offset);
    offsets.insert(pos, offset);
}

fn merge_sorted(offsets: &mut Vec<usize>, more: &[usize]) {
    offsets.extend_from_slice(more);
    offsets.sort_unstable();
}

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Find repeating sequences in `items` and the order that reproduces it.
pub fn detect_sequences<T: Clone + PartialEq>(items: &[T]) -> Result<SequenceData<T>> {
    if items.is_empty() {
        return Ok(SequenceData { sequences: Vec::new(), order: Vec::new() });
    }

    let mut arena = Arena::new();
    seed_windows(&mut arena, items);
    reduce_dominated(&mut arena);
    truncate_overlaps(&mut arena);
    fold_repetitions(&mut arena);
    arena.sort_by_first_offset();
    extract_endings(&mut arena);
    concatenate_followers(&mut arena);
    let order = collect_order(&arena, items.len())?;

    let sequences: Vec<Sequence<T>> = arena
        .order
        .iter()
        .map(|&id| {
            let candidate = &arena.candidates[id];
            match &candidate.endings {
                None => Sequence::Stem(candidate.items.clone()),
                Some(endings) => Sequence::WithEndings {
                    stem: candidate.items.clone(),
                    endings: endings.iter().map(|e| e.items.clone()).collect(),
                },
            }
        })
        .collect();

    debug!(
        items = items.len(),
        sequences = sequences.len(),
        order_entries = order.len(),
        "detected sequences"
    );

    Ok(SequenceData { sequences, order })
}

// ─── Passes ─────────────────────────────────────────────────────────────

fn seed_windows<T: Clone + PartialEq>(arena: &mut Arena<T>, items: &[T]) {
    for start in 0..items.len() {
        let end = (start + WINDOW).min(items.len());
        let window = &items[start..end];
        match arena.find_by_items(window) {
            Some(id) => arena.candidates[id].offsets.push(start),
            None => arena.push(window.to_vec(), vec![start]),
        }
    }
}

fn reduce_dominated<T: Clone + PartialEq>(arena: &mut Arena<T>) {
    arena.sort_by_count();

    let mut current = 0;
    while current + 1 < arena.order.len() {
        let id = arena.order[current];
        let candidate = &arena.candidates[id];
        let covered: Vec<usize> = (1..candidate.items.len())
            .flat_map(move |shift| candidate.offsets.iter().map(move |o| o + shift))
            .collect();

        let mut later = current + 1;
        while later < arena.order.len() {
            let test_id = arena.order[later];
            arena.candidates[test_id].offsets.retain(|o| !covered.contains(o));
            if arena.candidates[test_id].offsets.is_empty() {
                arena.order.remove(later);
            } else {
                later += 1;
            }
        }

        arena.sort_by_count();
        current += 1;
    }
}

fn truncate_overlaps<T: Clone + PartialEq>(arena: &mut Arena<T>) {
    let mut starts: Vec<usize> = arena
        .order
        .iter()
        .flat_map(|&id| arena.candidates[id].offsets.iter().copied())
        .collect();
    starts.sort_unstable();

    for pair in starts.windows(2) {
        let (offset, next) = (pair[0], pair[1]);
        let gap = next - offset;
        if gap >= WINDOW {
            continue;
        }

        let Some(position) = arena
            .order
            .iter()
            .position(|&id| arena.candidates[id].offsets.contains(&offset))
        else {
            continue;
        };
        let id = arena.order[position];
        let candidate = &arena.candidates[id];
        let truncated: Vec<T> = candidate.items[..gap.min(candidate.items.len())].to_vec();

        match arena.find_by_items(&truncated) {
            Some(known) if known == id => continue,
            Some(known) => insert_sorted(&mut arena.candidates[known].offsets, offset),
            None => arena.push(truncated, vec![offset]),
        }

        arena.candidates[id].offsets.retain(|&o| o != offset);
        if arena.candidates[id].offsets.is_empty() {
            arena.order.remove(position);
        }
    }
}

fn fold_repetitions<T: Clone + PartialEq>(arena: &mut Arena<T>) {
    let mut current = 0;
    while current < arena.order.len() {
        let id = arena.order[current];
        let len = arena.candidates[id].items.len();
        let mut removed = false;

        for size in 1..len {
            if len % size != 0 {
                continue;
            }
            let items = &arena.candidates[id].items;
            let chunk = &items[..size];
            if !items.chunks(size).all(|c| c == chunk) {
                continue;
            }

            let chunk = chunk.to_vec();
            let base = arena.candidates[id].offsets.clone();
            let mut offsets = base.clone();
            for shift in (size..len).step_by(size) {
                offsets.extend(base.iter().map(|o| o + shift));
            }
            offsets.sort_unstable();

            match arena.find_by_items(&chunk) {
                Some(known) => {
                    merge_sorted(&mut arena.candidates[known].offsets, &offsets);
                    arena.order.remove(current);
                    removed = true;
                }
                None => {
                    let candidate = &mut arena.candidates[id];
                    candidate.items = chunk;
                    candidate.offsets = offsets;
                }
            }
            break;
        }

        if !removed {
            current += 1;
        }
    }
}

fn extract_endings<T: Clone + PartialEq>(arena: &mut Arena<T>) {
    let stem_len = WINDOW - ENDING_SIZE;

    let mut current = 0;
    while current + 1 < arena.order.len() {
        let id = arena.order[current];

        let mut test = current + 1;
        while test < arena.order.len() {
            let test_id = arena.order[test];
            let (cur, other) = (&arena.candidates[id], &arena.candidates[test_id]);

            let first_ending = cur.endings.is_none()
                && cur.items.len() == WINDOW
                && other.items.len() == WINDOW
                && cur.items[..stem_len] == other.items[..stem_len];
            let another_ending = cur.endings.is_some()
                && cur.items.len() == stem_len
                && other.items.len() == WINDOW
                && cur.items[..] == other.items[..stem_len];

            if !(first_ending || another_ending) {
                test += 1;
                continue;
            }

            let other_ending = Ending {
                items: other.items[stem_len..].to_vec(),
                offsets: other.offsets.iter().map(|o| o + stem_len).collect(),
            };
            let other_offsets = other.offsets.clone();

            let candidate = &mut arena.candidates[id];
            if first_ending {
                let own_ending = Ending {
                    items: candidate.items.split_off(stem_len),
                    offsets: candidate.offsets.iter().map(|o| o + stem_len).collect(),
                };
                candidate.endings = Some(vec![own_ending, other_ending]);
            } else if let Some(endings) = candidate.endings.as_mut() {
                endings.push(other_ending);
            }
            merge_sorted(&mut candidate.offsets, &other_offsets);

            arena.order.remove(test);
        }

        current += 1;
    }
}

fn concatenate_followers<T: Clone + PartialEq>(arena: &mut Arena<T>) {
    loop {
        let mut changed = false;

        let mut current = 0;
        while current + 1 < arena.order.len() {
            let (id, next_id) = (arena.order[current], arena.order[current + 1]);
            let (cur, next) = (&arena.candidates[id], &arena.candidates[next_id]);

            let always_followed = cur.endings.is_none()
                && next.endings.is_none()
                && cur.offsets.len() == next.offsets.len()
                && cur
                    .offsets
                    .iter()
                    .all(|o| next.offsets.binary_search(&(o + cur.items.len())).is_ok());

            if always_followed {
                let tail = next.items.clone();
                arena.candidates[id].items.extend(tail);
                arena.order.remove(current + 1);
                changed = true;
            }
            current += 1;
        }

        if !changed {
            break;
        }
    }
}

fn collect_order<T>(arena: &Arena<T>, len: usize) -> Result<Vec<OrderEntry>> {
    let mut order: Vec<OrderEntry> = Vec::new();
    let mut offset = 0;

    while offset < len {
        let sequence_index = arena
            .order
            .iter()
            .position(|&id| {
                let candidate = &arena.candidates[id];
                candidate.offsets.contains(&offset)
                    || candidate
                        .endings
                        .iter()
                        .flatten()
                        .any(|e| e.offsets.contains(&offset))
            })
            .ok_or(TabError::UnmatchedOffset { offset })?;
        let candidate = &arena.candidates[arena.order[sequence_index]];
        let stem_len = candidate.items.len();

        let (ending_index, ending_len) = match &candidate.endings {
            None => (None, 0),
            Some(endings) => {
                let ending_offset = offset + stem_len;
                let index = endings
                    .iter()
                    .position(|e| e.offsets.contains(&ending_offset))
                    .ok_or(TabError::UnmatchedOffset { offset: ending_offset })?;
                (Some(index), endings[index].items.len())
            }
        };

        match order.last_mut() {
            Some(last)
                if last.sequence_index == sequence_index && last.ending_index == ending_index =>
            {
                last.times += 1;
            }
            _ => order.push(OrderEntry { sequence_index, ending_index, times: 1 }),
        }

        let step = stem_len + ending_len;
        if step == 0 {
            return Err(TabError::UnmatchedOffset { offset });
        }
        offset += step;
    }

    Ok(order)
}
