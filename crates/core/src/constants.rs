//! Byte-level constants shared by every detector.
//!
//! These must match what dgsh itself embeds and writes, so they are spelled
//! out as raw bytes rather than derived.

/// Owner name carried by the `.note.ident` note of a dgsh-compatible binary.
///
/// The trailing NUL is part of the name: the note's `n_namesz` must equal the
/// full length of this slice, not just the visible characters.
pub const DGSH_NOTE_NAME: &[u8] = b"DSpinellis/dgsh\0";

/// Section holding the identification note.
pub const NOTE_SECTION_NAME: &[u8] = b".note.ident";

/// Tokens which, when present on a script line, mark it as dgsh-aware.
///
/// Order matters only for reporting: on the earliest line carrying any marker,
/// the first one listed here is the one surfaced in a [`crate::Finding`].
pub const SCRIPT_MARKERS: [&str; 3] = ["dgsh-wrap", "--dgsh", "env dgsh"];

/// Token a script may place at the start of its second line.
pub const MAGIC_SCRIPT_LINE: &[u8] = b"#!dgsh";

/// Window (in bytes) inspected when looking at a script.
pub const MAX_LINE_LEN: usize = 1024;

/// Interpreter-script prefix.
pub const SHEBANG: &[u8] = b"#!";

/// ELF identification bytes.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
