//! Interpreter-script detection.
//!
//! A script is dgsh-compatible when either:
//! - one of [`SCRIPT_MARKERS`] appears on a line starting within the first
//!   [`MAX_LINE_LEN`] bytes, or
//! - its second line starts with [`MAGIC_SCRIPT_LINE`].

use log::trace;

use crate::constants::{MAGIC_SCRIPT_LINE, MAX_LINE_LEN, SCRIPT_MARKERS};
use crate::scan::{line_find, line_starts};

/// Why a script was (or was not) accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptVerdict {
    /// A marker token was found; carries the token.
    Marker(&'static str),
    /// The second line begins with the magic token.
    MagicLine,
    /// Neither check succeeded.
    NotDgsh,
}

impl ScriptVerdict {
    pub fn is_dgsh(self) -> bool {
        !matches!(self, ScriptVerdict::NotDgsh)
    }
}

/// Return the first marker found within the script window, if any.
///
/// Lines are visited in order and the earliest line carrying a marker wins;
/// within that line markers are tried in declaration order.
pub fn find_marker(buf: &[u8]) -> Option<&'static str> {
    let bound = buf.len().min(MAX_LINE_LEN);
    line_starts(buf, MAX_LINE_LEN).find_map(|start| {
        SCRIPT_MARKERS.iter().copied().find(|marker| {
            let hit = line_find(&buf[start..], marker.as_bytes(), bound - start);
            if let Some(pos) = hit {
                trace!("script marker {marker:?} at offset {}", start + pos);
            }
            hit.is_some()
        })
    })
}

/// True if the line following the first `\n` starts with `#!dgsh`.
///
/// Only the bytes inside the script window are considered.
pub fn has_magic_second_line(buf: &[u8]) -> bool {
    let window = &buf[..buf.len().min(MAX_LINE_LEN)];
    let Some(newline) = window.iter().position(|b| *b == b'\n') else {
        return false;
    };
    window[newline + 1..].starts_with(MAGIC_SCRIPT_LINE)
}

/// Run both script checks and report which one matched.
pub fn classify_script(buf: &[u8]) -> ScriptVerdict {
    if let Some(marker) = find_marker(buf) {
        ScriptVerdict::Marker(marker)
    } else if has_magic_second_line(buf) {
        ScriptVerdict::MagicLine
    } else {
        ScriptVerdict::NotDgsh
    }
}

/// Boolean shorthand for [`classify_script`].
pub fn is_dgsh_script(buf: &[u8]) -> bool {
    classify_script(buf).is_dgsh()
}
