use std::path::PathBuf;

/// Default directory for cached draft reviews.
pub const DEFAULT_CACHE_DIR: &str = ".jobreview/cache";

/// Local cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory holding one snapshot file per job.
    pub cache_dir: PathBuf,
}

impl CacheConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default             |
    /// |-----------------------|---------------------|
    /// | `JOBREVIEW_CACHE_DIR` | `.jobreview/cache`  |
    pub fn from_env() -> Self {
        let cache_dir = std::env::var("JOBREVIEW_CACHE_DIR")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CACHE_DIR.into());

        Self {
            cache_dir: PathBuf::from(cache_dir),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }
}
