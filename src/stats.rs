use crate::manager::LiveStateManager;
use crate::models::SystemStats;
use log::debug;
use std::sync::Arc;

/// Recount connected users and active chats. Health, uptime and extra fields
/// carry over from the stored snapshot.
///
/// A user counts as connected if seen within `window_ms` and not marked
/// offline; a chat is active if its last message falls within the window.
pub fn collect_stats(manager: &LiveStateManager, window_ms: i64) -> SystemStats {
    let now = manager.now_ms();
    let current = manager.get_system_stats();

    let connected_users = manager
        .get_users()
        .iter()
        .filter(|u| now - u.last_seen < window_ms && u.status.as_deref() != Some("offline"))
        .count();

    let active_chats = manager
        .channels()
        .iter()
        .filter(|c| {
            manager
                .get_messages(c)
                .last()
                .is_some_and(|m| now - m.timestamp < window_ms)
        })
        .count();

    SystemStats {
        connected_users: u64::try_from(connected_users).unwrap_or(u64::MAX),
        active_chats: u64::try_from(active_chats).unwrap_or(u64::MAX),
        last_updated: None,
        ..current
    }
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX).saturating_mul(1000)
}

/// Spawns a background task that refreshes the stats snapshot every `interval_secs`.
pub fn spawn_stats_task(manager: Arc<LiveStateManager>, interval_secs: u64, window_secs: u64) {
    if interval_secs == 0 {
        return;
    }
    tokio::spawn(async move {
        let window_ms = secs_to_ms(window_secs);
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(interval_secs)).await;
            let stats = collect_stats(&manager, window_ms);
            debug!(
                "stats refresh: {} connected, {} active chats",
                stats.connected_users, stats.active_chats
            );
            manager.update_system_stats(stats);
        }
    });
}
