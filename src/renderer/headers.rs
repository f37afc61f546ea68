//! Tuning and time-signature header blocks.

use crate::model::TimeSignature;

use super::constants::{HEADER_SEPARATOR, TUNING_SEPARATOR};
use super::text::{pad_start, text_width};

/// String names right-aligned to the widest name, each followed by `|`.
pub(super) fn render_tuning(string_names: &[String]) -> String {
    let width = string_names.iter().map(|n| text_width(n)).max().unwrap_or(0);
    string_names
        .iter()
        .map(|name| format!("{}{TUNING_SEPARATOR}", pad_start(name, width, ' ')))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Time signature header for a bar.
///
/// With a single string the signature is written inline (`3/16:`). Otherwise
/// numerator and denominator are stacked on the two middle rows, right-aligned,
/// and every row ends with `:`.
pub(super) fn render_time_signature(time_signature: TimeSignature, string_count: usize) -> String {
    let numerator = time_signature.numerator.to_string();
    let denominator = time_signature.denominator.to_string();

    if string_count <= 1 {
        return format!("{numerator}/{denominator}{HEADER_SEPARATOR}");
    }

    let width = text_width(&numerator).max(text_width(&denominator));
    let first = (string_count - 2) / 2;
    (0..string_count)
        .map(|row| {
            let text = if row == first {
                numerator.as_str()
            } else if row == first + 1 {
                denominator.as_str()
            } else {
                ""
            };
            format!("{}{HEADER_SEPARATOR}", pad_start(text, width, ' '))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
