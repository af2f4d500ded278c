//! Turn progress reporting on the terminal.

pub mod reporter;
