use crate::models::TypingMap;

/// Typing signals older than this are treated as stale.
pub const DEFAULT_STALE_MS: i64 = 5000;

/// Entries of `typing` whose last signal is no more than `threshold_ms` before `now_ms`.
pub fn prune_stale(typing: &TypingMap, now_ms: i64, threshold_ms: i64) -> TypingMap {
    typing
        .iter()
        .filter(|&(_, &ts)| now_ms - ts <= threshold_ms)
        .map(|(user, &ts)| (user.clone(), ts))
        .collect()
}
