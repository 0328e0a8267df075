//! Top-level dispatch: script or ELF, then a single verdict.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{ELF_MAGIC, SHEBANG};
use crate::elf::{self, ElfClass, ElfIdent};
use crate::script::{self, ScriptVerdict};

/// What kind of program the buffer looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramKind {
    Script,
    Elf32,
    Elf64,
    /// ELF magic present but the class byte is not recognised (or missing).
    UnknownElf,
    Unrecognized,
}

/// The evidence behind a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Finding {
    /// A script line carries one of the dgsh marker tokens.
    ScriptMarker { marker: String },
    /// The script's second line starts with `#!dgsh`.
    MagicLine,
    /// The binary has a `.note.ident` note owned by dgsh.
    NoteSection,
    /// The binary is structurally broken; treated as incompatible.
    Malformed { reason: String },
}

/// Result of classifying one buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub kind: ProgramKind,
    pub compatible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finding: Option<Finding>,
}

impl Detection {
    fn incompatible(kind: ProgramKind) -> Self {
        Self { kind, compatible: false, finding: None }
    }
}

/// Classify `buf` and explain the outcome.
///
/// Buffers starting with `#!` are treated as scripts; anything else must
/// carry the ELF magic or it is rejected outright.
pub fn detect(buf: &[u8]) -> Detection {
    if buf.starts_with(SHEBANG) {
        return match script::classify_script(buf) {
            ScriptVerdict::Marker(marker) => Detection {
                kind: ProgramKind::Script,
                compatible: true,
                finding: Some(Finding::ScriptMarker { marker: marker.to_string() }),
            },
            ScriptVerdict::MagicLine => Detection {
                kind: ProgramKind::Script,
                compatible: true,
                finding: Some(Finding::MagicLine),
            },
            ScriptVerdict::NotDgsh => Detection::incompatible(ProgramKind::Script),
        };
    }

    if !buf.starts_with(&ELF_MAGIC) {
        debug!("neither a script nor an ELF image ({} bytes)", buf.len());
        return Detection::incompatible(ProgramKind::Unrecognized);
    }

    let kind = match ElfIdent::parse(buf).map(|ident| ident.class) {
        Ok(ElfClass::Elf32) => ProgramKind::Elf32,
        Ok(ElfClass::Elf64) => ProgramKind::Elf64,
        _ => ProgramKind::UnknownElf,
    };
    match elf::has_dgsh_note(buf) {
        Ok(true) => Detection { kind, compatible: true, finding: Some(Finding::NoteSection) },
        Ok(false) => Detection::incompatible(kind),
        Err(err) => {
            debug!("malformed ELF image: {err}");
            Detection {
                kind,
                compatible: false,
                finding: Some(Finding::Malformed { reason: err.to_string() }),
            }
        }
    }
}

/// Return `true` if the program image in `buf` declares dgsh compatibility.
///
/// Never fails: every structural problem is reported as `false`.
pub fn is_protocol_compatible(buf: &[u8]) -> bool {
    detect(buf).compatible
}
