//! Library half of the `is-dgsh` CLI.
//!
//! Kept separate from `main.rs` so command logic can be driven directly from
//! tests, the same way the binary drives it.

pub mod commands;

pub use commands::*;

/// Exit status for a dgsh-compatible program.
pub const EXIT_COMPATIBLE: i32 = 0;

/// Exit status for usage errors and other fatal failures.
pub const EXIT_FATAL: i32 = 1;

/// Exit status for programs that are incompatible or cannot be read.
pub const EXIT_INCOMPATIBLE: i32 = 2;

/// Map a verdict to the process exit status.
pub fn exit_code(compatible: bool) -> i32 {
    if compatible {
        EXIT_COMPATIBLE
    } else {
        EXIT_INCOMPATIBLE
    }
}
