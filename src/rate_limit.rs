use std::collections::HashMap;
use std::env;
use std::sync::Mutex;
use std::time::Instant;

/// Per-action request budgets. Loaded from env, or built directly in tests.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_max: usize,
    pub login_window_secs: u64,
    pub messages_max: usize,
    pub messages_window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            login_max: 10,
            login_window_secs: 60,
            messages_max: 60,
            messages_window_secs: 60,
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        RateLimitConfig {
            login_max: env_parse("RATE_LIMIT_LOGIN").unwrap_or(defaults.login_max),
            login_window_secs: defaults.login_window_secs,
            messages_max: env_parse("RATE_LIMIT_MESSAGES").unwrap_or(defaults.messages_max),
            messages_window_secs: defaults.messages_window_secs,
        }
    }
}

pub(crate) fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

pub struct RateLimiter {
    limits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        RateLimiter {
            limits: Mutex::new(HashMap::new()),
        }
    }

    /// Check if a request is allowed. Returns true if allowed, false if rate limited.
    /// `key` is typically "action:ip", `max` is max requests, `window_secs` is the time window.
    pub fn check(&self, key: &str, max: usize, window_secs: u64) -> bool {
        let mut limits = self.limits.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let window = std::time::Duration::from_secs(window_secs);

        let entries = limits.entry(key.to_string()).or_default();

        // Remove expired entries
        entries.retain(|t| now.duration_since(*t) < window);

        if entries.len() >= max {
            return false;
        }

        entries.push(now);
        true
    }
}
