//! dgsh-detect-core
//!
//! Decide whether an executable declares compatibility with dgsh, the
//! directed-graph shell, by looking only at its contents.
//!
//! Two kinds of program are understood:
//! - interpreter scripts (`#!`), checked for marker tokens and a `#!dgsh`
//!   second line (see [`script`]);
//! - ELF binaries, checked for a `.note.ident` note owned by
//!   `DSpinellis/dgsh` (see [`elf`]).
//!
//! All logic is pure over `&[u8]`; [`source`] is the only part touching the
//! filesystem.

pub mod classify;
pub mod constants;
pub mod elf;
pub mod scan;
pub mod script;
pub mod source;

pub use classify::{detect, is_protocol_compatible, Detection, Finding, ProgramKind};
pub use source::{detect_path, is_dgsh_program, ProgramImage, SourceError};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
