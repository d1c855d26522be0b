//! Installs the process-wide `tracing-subscriber` once at startup,
//! configurable via `GLYPH_LOG` (§2 ADDED: "`glyph-cli` installs a
//! `tracing-subscriber` `EnvFilter` subscriber once at startup").

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_env("GLYPH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
