//! `glyph cache` (§6): inspect or clear the on-disk cache directory.
//!
//! The in-process [`glyph_sandbox::cache`] LRUs live only for the duration
//! of one `run`/`transpile` invocation; what persists across invocations is
//! the directory itself, so this command only ever reports or clears files
//! on disk rather than reaching into a running cache.

use crate::config::Config;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct Args {
    #[arg(long)]
    pub clear: bool,
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: Args, config: &Config) -> anyhow::Result<i32> {
    let dir = &config.cache_dir;

    if args.clear {
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        if args.json {
            println!("{}", serde_json::json!({ "cleared": true, "path": dir }));
        } else {
            println!("cleared cache at {}", dir.display());
        }
        return Ok(0);
    }

    let entry_count = std::fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0);

    if args.json {
        println!("{}", serde_json::json!({ "path": dir, "entries": entry_count }));
    } else {
        println!("{}: {} entries", dir.display(), entry_count);
    }

    Ok(0)
}
