use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "showroom.toml";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(4000);

/// How often a failed primary/backup round is repeated before the fallback
/// dataset is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first round; `0` disables retrying.
    pub retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based): `base * 2^attempt`,
    /// capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Entries younger than this are served without refetching.
    pub stale_time: Duration,
    /// How long a stale entry is kept before eviction.
    pub gc_time: Duration,
    pub refetch_on_window_focus: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(10 * 60),
            refetch_on_window_focus: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub primary_url: Option<Url>,
    pub backup_url: Option<Url>,
    pub primary_timeout: Duration,
    pub backup_timeout: Duration,
    pub probe_timeout: Duration,
    pub retry: RetryPolicy,
    pub cache: CachePolicy,
    pub autoplay_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            primary_url: None,
            backup_url: None,
            primary_timeout: DEFAULT_REQUEST_TIMEOUT,
            backup_timeout: DEFAULT_REQUEST_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            retry: RetryPolicy::default(),
            cache: CachePolicy::default(),
            autoplay_interval: DEFAULT_AUTOPLAY_INTERVAL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    backend_url: Option<String>,
    backup_url: Option<String>,
    request_timeout_ms: Option<u64>,
    retry_attempts: Option<u32>,
    autoplay_interval_ms: Option<u64>,
}

/// Loads settings from `showroom.toml` in the working directory and the
/// process environment. Environment values win over the file.
pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            if let Err(err) = settings.apply_toml(&raw) {
                warn!(path = %path.display(), error = %err, "ignoring unreadable config file");
            }
        }
        Err(_) => debug!(path = %path.display(), "no config file, using defaults"),
    }

    settings.apply_env(env);
    settings
}

impl Settings {
    pub fn apply_toml(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileConfig = toml::from_str(raw).context("invalid showroom config")?;

        if let Some(v) = file_cfg.backend_url {
            self.primary_url = parse_endpoint("backend_url", &v);
        }
        if let Some(v) = file_cfg.backup_url {
            self.backup_url = parse_endpoint("backup_url", &v);
        }
        if let Some(ms) = file_cfg.request_timeout_ms {
            self.set_request_timeout(Duration::from_millis(ms));
        }
        if let Some(retries) = file_cfg.retry_attempts {
            self.retry.retries = retries;
        }
        if let Some(ms) = file_cfg.autoplay_interval_ms {
            self.autoplay_interval = Duration::from_millis(ms);
        }
        Ok(())
    }

    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        for key in ["BACKEND_URL", "APP__BACKEND_URL"] {
            if let Some(v) = env(key) {
                self.primary_url = parse_endpoint(key, &v);
            }
        }
        for key in ["BACKUP_URL", "APP__BACKUP_URL"] {
            if let Some(v) = env(key) {
                self.backup_url = parse_endpoint(key, &v);
            }
        }

        if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.set_request_timeout(Duration::from_millis(parsed));
            }
        }
        if let Some(v) = env("APP__RETRY_ATTEMPTS") {
            if let Ok(parsed) = v.parse::<u32>() {
                self.retry.retries = parsed;
            }
        }
        if let Some(v) = env("APP__AUTOPLAY_INTERVAL_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.autoplay_interval = Duration::from_millis(parsed);
            }
        }
    }

    fn set_request_timeout(&mut self, timeout: Duration) {
        self.primary_timeout = timeout;
        self.backup_timeout = timeout;
    }
}

/// Blank values mean "not configured"; unparsable ones are logged and dropped.
fn parse_endpoint(source: &str, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!(source, value = raw, error = %err, "ignoring invalid endpoint url");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
