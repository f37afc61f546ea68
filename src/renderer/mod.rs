//! Tab renderer — converts `TrackData` into fixed-width text tablature.
//!
//! Each bar becomes its own multi-line block; headers (tuning, time
//! signatures) are kept separate so the riff formatter can place them where
//! they are needed. Use [`join_tabs`] to lay blocks side by side.

pub(crate) mod constants;
mod bar;
mod headers;
pub mod text;

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, TabError};
use crate::model::{TabData, TrackData};
use bar::render_bar;
use headers::{render_time_signature, render_tuning};

pub use text::join_tabs;

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Render a track into tuning header, time-signature headers and bar blocks.
///
/// The first bar must declare a time signature; later bars inherit the last
/// one declared. Time-signature headers are only produced where the
/// signature changes.
pub fn render_tab(track: &TrackData) -> Result<TabData> {
    let string_count = track.string_names.len();
    if string_count == 0 {
        return Err(TabError::Validation("track has no strings".into()));
    }

    let mut time_signatures = BTreeMap::new();
    let mut bars = Vec::with_capacity(track.bars.len());
    let mut active = None;

    for (bar_index, bar) in track.bars.iter().enumerate() {
        if let Some(ts) = bar.time_signature.filter(|&ts| Some(ts) != active) {
            active = Some(ts);
            time_signatures.insert(bar_index, render_time_signature(ts, string_count));
        }
        let ts = active.ok_or_else(|| {
            TabError::Validation("the first bar must declare a time signature".into())
        })?;
        bars.push(render_bar(bar, ts, string_count, bar_index)?);
    }

    debug!(
        track = %track.name,
        bars = bars.len(),
        strings = string_count,
        "rendered tab"
    );

    Ok(TabData {
        tuning: render_tuning(&track.string_names),
        time_signatures,
        bars,
    })
}

/// The whole track written out bar by bar, each bar preceded by its
/// time-signature header where the signature changes.
pub fn full_tab_bars(tab: &TabData) -> Vec<String> {
    tab.bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match tab.time_signatures.get(&i) {
            Some(ts) => join_tabs(&[ts.as_str(), bar.as_str()]),
            None => bar.clone(),
        })
        .collect()
}
