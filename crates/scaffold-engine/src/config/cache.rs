//! Per-user cache of the last generated project and its freshness rule

use crate::error::EngineError;
use std::path::{Path, PathBuf};

/// Milliseconds in one day
pub const MILLIS_PER_DAY: u64 = 86_400_000;

/// Default number of days a cached project stays fresh
pub const DEFAULT_CACHE_DAYS: u64 = 1;

const CACHE_DIR: &str = "cache";
const TIMESTAMP_FILE: &str = "updatedAt.txt";
const SETTINGS_FILE: &str = "settings.txt";

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Whether a cached project may be reused, evaluated at `now`.
///
/// `last_run` of `None` means the engine never completed a fresh build.
/// `no_cache` always wins; `offline` accepts any recorded run regardless of
/// its age.
pub fn is_cache_fresh_at(
    now: u64,
    last_run: Option<u64>,
    cache_days: u64,
    offline: bool,
    no_cache: bool,
) -> bool {
    if no_cache {
        return false;
    }
    let Some(last_run) = last_run else {
        return false;
    };
    offline || now.saturating_sub(last_run) < cache_days.saturating_mul(MILLIS_PER_DAY)
}

/// [`is_cache_fresh_at`] evaluated against the current time
pub fn is_cache_fresh(last_run: Option<u64>, cache_days: u64, offline: bool, no_cache: bool) -> bool {
    is_cache_fresh_at(now_millis(), last_run, cache_days, offline, no_cache)
}

/// Parse the contents of the timestamp file; empty, `0` or garbage is "never"
pub fn parse_timestamp(content: &str) -> Option<u64> {
    match content.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(millis) => Some(millis),
        Err(e) => {
            if !content.trim().is_empty() {
                log::debug!("Ignoring unreadable cache timestamp {:?}: {}", content, e);
            }
            None
        }
    }
}

/// Write `millis` as decimal text, creating parent directories
pub async fn write_timestamp(path: &Path, millis: u64) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, format!("{}\n", millis)).await
}

/// Locations of the per-user state (`~/.sensible` by default)
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at `~/<dir_name>`
    pub fn in_home(dir_name: &str) -> Result<Self, EngineError> {
        let home = dirs::home_dir().ok_or(EngineError::HomeDirNotFound)?;
        Ok(Self::new(home.join(dir_name)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE_DIR)
    }

    pub fn timestamp_path(&self) -> PathBuf {
        self.root.join(TIMESTAMP_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Create the store root so plan groups can use it as a working directory
    pub fn ensure_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Time of the last successful fresh build, if any
    pub fn last_run(&self) -> Option<u64> {
        match std::fs::read_to_string(self.timestamp_path()) {
            Ok(content) => parse_timestamp(&content),
            Err(_) => None,
        }
    }

    /// Persisted flag tokens from the settings file
    pub fn read_flags(&self) -> Vec<String> {
        match std::fs::read_to_string(self.settings_path()) {
            Ok(content) => super::settings::parse_flags(&content),
            Err(_) => Vec::new(),
        }
    }

    /// Freshness decision that also requires the cached tree to exist
    pub fn should_use_cache(&self, cache_days: u64, offline: bool, no_cache: bool) -> bool {
        let fresh = is_cache_fresh(self.last_run(), cache_days, offline, no_cache);
        if fresh && !self.cache_dir().is_dir() {
            log::warn!(
                "Cache timestamp found but {} is missing; building fresh",
                self.cache_dir().display()
            );
            return false;
        }
        fresh
    }
}
