//! Layered configuration (§2 ADDED): built-in defaults, then `glyph.toml`
//! in the working directory, then `GLYPH_`-prefixed environment
//! variables, then CLI flags (applied by each command after loading this).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cpu_timeout_secs: u64,
    pub memory_limit_bytes: u64,
    pub stdlib_mode: String,
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_timeout_secs: 30,
            memory_limit_bytes: 100 * 1024 * 1024,
            stdlib_mode: "native".to_string(),
            cache_dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("glyph-cache")
}

impl Config {
    /// Loads defaults, overlays `glyph.toml` in the current directory if
    /// present, then overlays any `GLYPH_`-prefixed environment variable.
    /// CLI flags are applied on top of the returned value by each command,
    /// since clap already parsed them by the time a command runs.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.merge_file(Path::new("glyph.toml"))?;
        config.merge_env();
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Ok(());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read { path: path.display().to_string(), message: e.to_string() })?;
        let file_config: FileConfig = toml::from_str(&text)
            .map_err(|e| ConfigError::Parse { path: path.display().to_string(), message: e.to_string() })?;
        file_config.apply(self);
        Ok(())
    }

    fn merge_env(&mut self) {
        if let Ok(v) = std::env::var("GLYPH_CPU_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse() {
                self.cpu_timeout_secs = parsed;
            }
        }
        if let Ok(v) = std::env::var("GLYPH_MEMORY_LIMIT_BYTES") {
            if let Ok(parsed) = v.parse() {
                self.memory_limit_bytes = parsed;
            }
        }
        if let Ok(v) = std::env::var("GLYPH_STDLIB_MODE") {
            self.stdlib_mode = v;
        }
        if let Ok(v) = std::env::var("GLYPH_CACHE_DIR") {
            self.cache_dir = PathBuf::from(v);
        }
    }
}

/// `glyph.toml`'s shape: every field optional, so a partial file only
/// overrides what it names.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    cpu_timeout_secs: Option<u64>,
    memory_limit_bytes: Option<u64>,
    stdlib_mode: Option<String>,
    cache_dir: Option<PathBuf>,
}

impl FileConfig {
    fn apply(self, config: &mut Config) {
        if let Some(v) = self.cpu_timeout_secs {
            config.cpu_timeout_secs = v;
        }
        if let Some(v) = self.memory_limit_bytes {
            config.memory_limit_bytes = v;
        }
        if let Some(v) = self.stdlib_mode {
            config.stdlib_mode = v;
        }
        if let Some(v) = self.cache_dir {
            config.cache_dir = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_sandbox_defaults() {
        let config = Config::default();
        assert_eq!(config.cpu_timeout_secs, 30);
        assert_eq!(config.memory_limit_bytes, 100 * 1024 * 1024);
        assert_eq!(config.stdlib_mode, "native");
    }

    #[test]
    fn file_config_only_overrides_named_fields() {
        let mut config = Config::default();
        let file_config: FileConfig = toml::from_str("cpu_timeout_secs = 5\n").unwrap();
        file_config.apply(&mut config);
        assert_eq!(config.cpu_timeout_secs, 5);
        assert_eq!(config.stdlib_mode, "native");
    }
}
