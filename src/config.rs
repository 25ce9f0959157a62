use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable overriding the cache directory location.
pub const CACHE_DIR_ENV: &str = "SPICE_KERNEL_DIR";

/// Directory under the user's home used when no override is given.
pub const DEFAULT_CACHE_DIR_NAME: &str = ".spice-kernels";

/// Seconds allowed for a single download attempt against one candidate URL.
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Seconds allowed for a remote directory-listing request.
pub const LISTING_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration for the kernel engine.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Explicit cache directory. When absent, `SPICE_KERNEL_DIR` and then
    /// the per-user default are consulted.
    pub cache_dir: Option<PathBuf>,
    /// Per-attempt download timeout in seconds.
    pub download_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            download_timeout_secs: DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Resolve the cache directory: explicit override, then the
    /// `SPICE_KERNEL_DIR` environment variable, then `~/.spice-kernels`.
    pub fn resolve_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
            if !dir.trim().is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_CACHE_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        // An explicit override beats the environment variable.
        std::env::set_var(CACHE_DIR_ENV, "/tmp/env-kernels");
        let cfg = EngineConfig {
            cache_dir: Some(PathBuf::from("/tmp/kernels")),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_cache_dir(), PathBuf::from("/tmp/kernels"));

        // Without the override, the env var applies.
        let cfg = EngineConfig::default();
        assert_eq!(cfg.resolve_cache_dir(), PathBuf::from("/tmp/env-kernels"));

        // Without either, the per-user default applies.
        std::env::remove_var(CACHE_DIR_ENV);
        let dir = EngineConfig::default().resolve_cache_dir();
        assert!(dir.ends_with(DEFAULT_CACHE_DIR_NAME));
    }
}
