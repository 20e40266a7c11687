use crate::rate_limit::{RateLimitConfig, env_parse};
use crate::typing::DEFAULT_STALE_MS;
use std::env;

/// Which durable store backs the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
    /// No durable store: pub/sub only.
    None,
}

impl StoreKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Some(StoreKind::Sqlite),
            "memory" => Some(StoreKind::Memory),
            "none" => Some(StoreKind::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub store: StoreKind,
    pub typing_stale_ms: i64,
    /// 0 disables the stats refresher.
    pub stats_interval_secs: u64,
    pub presence_window_secs: u64,
    pub rate_limits: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: "data/live_state.db".to_string(),
            store: StoreKind::Sqlite,
            typing_stale_ms: DEFAULT_STALE_MS,
            stats_interval_secs: 30,
            presence_window_secs: 300,
            rate_limits: RateLimitConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let store = match env::var("LIVE_STATE_STORE") {
            Ok(v) => StoreKind::parse(&v).unwrap_or_else(|| {
                log::warn!("unknown LIVE_STATE_STORE {v:?}, using sqlite");
                StoreKind::Sqlite
            }),
            Err(_) => defaults.store,
        };
        Config {
            database_path: env::var("DATABASE_PATH").unwrap_or(defaults.database_path),
            store,
            typing_stale_ms: env_parse("TYPING_STALE_MS").unwrap_or(defaults.typing_stale_ms),
            stats_interval_secs: env_parse("STATS_INTERVAL_SECS")
                .unwrap_or(defaults.stats_interval_secs),
            presence_window_secs: env_parse("PRESENCE_WINDOW_SECS")
                .unwrap_or(defaults.presence_window_secs),
            rate_limits: RateLimitConfig::from_env(),
        }
    }

    /// Sqlite at `db_path`, everything else default.
    pub fn with_db(db_path: &str) -> Self {
        Config {
            database_path: db_path.to_string(),
            ..Self::default()
        }
    }
}
