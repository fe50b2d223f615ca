//! Subcommand handlers.

pub mod render;
pub mod run;
pub mod search;
