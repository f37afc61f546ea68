//! tabriff — guitar tablature renderer and riff detector.
//!
//! Reads Songsterr track data, renders it as text tablature and compresses
//! the tab into riffs: repeating runs of bars, written once, followed by the
//! order they are played in.
//!
//! # Example
//! ```no_run
//! use tabriff::{riff_sheet_from_file, RenderOptions};
//!
//! let sheet = riff_sheet_from_file("path/to/track.json").unwrap();
//! println!("{}", sheet.render(&RenderOptions::default()));
//! ```

pub mod error;
pub mod model;
pub mod note_time;
pub mod renderer;
pub mod riffs;
pub mod sequence;
pub mod songsterr;
pub mod unroller;

use std::path::Path;

pub use error::{Result, TabError};
pub use model::*;
pub use note_time::NoteTime;
pub use renderer::{join_tabs, render_tab};
pub use riffs::{build_riff_sheet, render_full_tab, render_riffs, RenderOptions, RiffOrder, RiffSheet};
pub use sequence::{detect_sequences, Sequence, SequenceData};
pub use songsterr::{parse_songsterr_json, to_track_data, SongsterrData};

/// Parse a Songsterr JSON payload and convert it to track data.
pub fn track_from_json(json: &str) -> Result<TrackData> {
    let data = parse_songsterr_json(json)?;
    to_track_data(&data)
}

/// Read a Songsterr JSON file and convert it to track data.
pub fn track_from_file<P: AsRef<Path>>(path: P) -> Result<TrackData> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| TabError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    track_from_json(&json)
}

/// Read a Songsterr JSON file and build its riff sheet.
/// Convenience function combining import, rendering and riff detection.
pub fn riff_sheet_from_file<P: AsRef<Path>>(path: P) -> Result<RiffSheet> {
    let track = track_from_file(path)?;
    let tab = render_tab(&track)?;
    build_riff_sheet(&tab)
}

/// Convert a rendered tab to a JSON string.
/// Useful for passing data across FFI boundaries.
pub fn tab_to_json(tab: &TabData) -> Result<String> {
    Ok(serde_json::to_string_pretty(tab)?)
}

/// Read a Songsterr JSON file and render its riff sheet as text.
///
/// `max_line_width` of 0 uses the default (84 columns).
pub fn render_file_to_text<P: AsRef<Path>>(path: P, max_line_width: usize) -> Result<String> {
    let mut options = RenderOptions::default();
    if max_line_width > 0 {
        options.max_line_width = max_line_width;
    }
    Ok(riff_sheet_from_file(path)?.render(&options))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — static library / shared library consumers
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

/// Render a Songsterr JSON file as riff text and return it as a C string.
/// The caller must free the returned string with `tabriff_free_string`.
///
/// `max_line_width` of 0 uses the default.
///
/// # Safety
/// `path` must be a valid null-terminated UTF-8 C string.
#[no_mangle]
pub unsafe extern "C" fn tabriff_render_file(
    path: *const c_char,
    max_line_width: usize,
) -> *mut c_char {
    if path.is_null() {
        return std::ptr::null_mut();
    }
    let c_str = unsafe { CStr::from_ptr(path) };
    let path_str = match c_str.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };

    match render_file_to_text(path_str, max_line_width) {
        Ok(text) => CString::new(text).unwrap_or_default().into_raw(),
        Err(e) => {
            tracing::warn!(path = path_str, error = %e, "failed to render file");
            std::ptr::null_mut()
        }
    }
}

/// Free a string previously returned by tabriff functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a tabriff function, or null.
#[no_mangle]
pub unsafe extern "C" fn tabriff_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}
