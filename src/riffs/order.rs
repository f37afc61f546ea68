//! Play-order entries and their labels.

use serde::{Deserialize, Serialize};

/// One step of the riff play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiffOrder {
    /// A riff (optionally with one of its endings) played `times` in a row
    Riff {
        riff_index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ending_index: Option<usize>,
        times: usize,
    },
    /// Silent bars
    Rest { bars: usize },
}

impl RiffOrder {
    pub fn riff(riff_index: usize, times: usize) -> Self {
        RiffOrder::Riff { riff_index, ending_index: None, times }
    }

    pub fn ending(riff_index: usize, ending_index: usize, times: usize) -> Self {
        RiffOrder::Riff { riff_index, ending_index: Some(ending_index), times }
    }
}

/// `[Riff 1]`, the heading shown above a riff.
pub fn riff_label(riff_index: usize) -> String {
    format!("[Riff {}]", riff_index + 1)
}

/// `Riff 2[1] (x3)`: one entry of the order summary.
pub fn order_label(entry: &RiffOrder) -> String {
    match *entry {
        RiffOrder::Riff { riff_index, ending_index, times } => {
            let mut label = format!("Riff {}", riff_index + 1);
            if let Some(ending) = ending_index {
                label.push_str(&format!("[{}]", ending + 1));
            }
            if times > 1 {
                label.push_str(&format!(" (x{times})"));
            }
            label
        }
        RiffOrder::Rest { bars: 1 } => "1 bar rest".to_string(),
        RiffOrder::Rest { bars } => format!("{bars} bars rest"),
    }
}

/// The `Order: ...` summary line.
///
/// A riff played once through each of its endings in turn is shown as a
/// plain riff entry, and consecutive identical entries are merged.
pub fn render_order(order: &[RiffOrder]) -> String {
    let summary: Vec<String> = summarize(order).iter().map(order_label).collect();
    format!("Order: {}", summary.join(", "))
}

fn summarize(order: &[RiffOrder]) -> Vec<RiffOrder> {
    let mut collapsed = Vec::with_capacity(order.len());
    let mut i = 0;
    while i < order.len() {
        match collapse_endings(order, i) {
            Some((entry, consumed)) => {
                collapsed.push(entry);
                i += consumed;
            }
            None => {
                collapsed.push(order[i]);
                i += 1;
            }
        }
    }

    let mut merged: Vec<RiffOrder> = Vec::with_capacity(collapsed.len());
    for entry in collapsed {
        match (merged.last_mut(), entry) {
            (
                Some(RiffOrder::Riff { riff_index, ending_index, times }),
                RiffOrder::Riff { riff_index: next_riff, ending_index: next_ending, times: more },
            ) if *riff_index == next_riff && *ending_index == next_ending => *times += more,
            (Some(RiffOrder::Rest { bars }), RiffOrder::Rest { bars: more }) => *bars += more,
            _ => merged.push(entry),
        }
    }
    merged
}

/// If `order[start..]` begins with endings 1..=n of one riff, each played
/// once, return the plain riff entry and how many entries it replaces.
fn collapse_endings(order: &[RiffOrder], start: usize) -> Option<(RiffOrder, usize)> {
    let RiffOrder::Riff { riff_index, ending_index: Some(0), times: 1 } = order[start] else {
        return None;
    };
    let ending_count = order
        .iter()
        .filter_map(|e| match *e {
            RiffOrder::Riff { riff_index: r, ending_index: Some(ending), .. } if r == riff_index => {
                Some(ending + 1)
            }
            _ => None,
        })
        .max()?;

    let run = order.get(start..start + ending_count)?;
    let complete = run.iter().enumerate().all(|(ending, entry)| {
        *entry == RiffOrder::ending(riff_index, ending, 1)
    });
    complete.then(|| (RiffOrder::riff(riff_index, 1), ending_count))
}
