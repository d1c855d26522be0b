//! `glyph` command-line interface (§6): the single external surface over
//! the transpiler, analyzer and sandbox crates.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
