//! Riff sheet — the compact form of a tab.
//!
//! Rendered bars are fed to the sequence detector; the patterns it finds
//! become riffs, silent single-bar patterns become rests, and the riffs are
//! formatted and laid out as text followed by the play order.

pub mod format;
pub mod layout;
pub mod order;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model::{BarToken, TabData};
use crate::renderer::constants::{BAR_LINE, STRING_SPACER};
use crate::sequence::{detect_sequences, Sequence};

pub use format::{format_riffs, FormattedRiff};
pub use layout::{
    max_line_width, minimum_line_width, render_full_tab, render_riffs, RenderOptions,
};
pub use order::{order_label, render_order, riff_label, RiffOrder};

/// Everything the layout needs: tuning, riffs and play order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiffSheet {
    pub tuning: String,
    pub riffs: Vec<FormattedRiff>,
    pub order: Vec<RiffOrder>,
}

impl RiffSheet {
    pub fn render(&self, options: &RenderOptions) -> String {
        render_riffs(&self.tuning, &self.riffs, &self.order, options)
    }

    /// The narrowest `max_line_width` this sheet can honour.
    pub fn minimum_line_width(&self, options: &RenderOptions) -> usize {
        minimum_line_width(&self.tuning, &self.riffs, options)
    }
}

/// Detect the riffs of a rendered tab and format them.
pub fn build_riff_sheet(tab: &TabData) -> Result<RiffSheet> {
    let tokens = tab.bar_tokens();
    let detected = detect_sequences(&tokens)?;

    let rests: Vec<usize> = detected
        .sequences
        .iter()
        .enumerate()
        .filter_map(|(i, sequence)| match sequence {
            Sequence::Stem(bars) if bars.len() == 1 && is_rest_bar(&bars[0].bar) => Some(i),
            _ => None,
        })
        .collect();

    let order: Vec<RiffOrder> = detected
        .order
        .iter()
        .map(|entry| {
            if rests.contains(&entry.sequence_index) {
                RiffOrder::Rest { bars: entry.times }
            } else {
                let skipped = rests.iter().filter(|&&r| r < entry.sequence_index).count();
                RiffOrder::Riff {
                    riff_index: entry.sequence_index - skipped,
                    ending_index: entry.ending_index,
                    times: entry.times,
                }
            }
        })
        .collect();

    let riffs: Vec<Sequence<BarToken>> = detected
        .sequences
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !rests.contains(i))
        .map(|(_, sequence)| sequence)
        .collect();

    debug!(
        bars = tokens.len(),
        riffs = riffs.len(),
        rests = rests.len(),
        "built riff sheet"
    );

    Ok(RiffSheet {
        tuning: tab.tuning.clone(),
        riffs: format_riffs(&riffs, &order),
        order,
    })
}

/// A bar with nothing but empty strings.
pub fn is_rest_bar(bar: &str) -> bool {
    bar.chars()
        .all(|c| c == STRING_SPACER || c == BAR_LINE || c == ' ' || c == '\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_rest_bars() {
        assert!(is_rest_bar("----|\n----|"));
        assert!(!is_rest_bar("--~-|\n----|"));
        assert!(!is_rest_bar("-3--|\n----|"));
    }
}
