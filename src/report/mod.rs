//! Reporting utilities: formatted terminal output for result objects.

pub mod format;

pub use format::*;
