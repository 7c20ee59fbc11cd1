//! Subcommand handlers.

pub mod check;
pub mod run;
pub mod scan;
pub mod to_r;
