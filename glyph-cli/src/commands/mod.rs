//! Module-per-subcommand (§6 ADDED): each submodule owns an `Args` struct
//! and an `execute` function returning `anyhow::Result<i32>` (the process
//! exit code), so `main` has one place that maps errors to the exit-code
//! table and never panics out to the shell.

pub mod audit;
pub mod cache;
pub mod parse;
pub mod run;
pub mod transpile;
