use crate::events::LiveFeed;
use log::warn;
use rocket::response::stream::{Event, EventStream};
use rocket::{get, State};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, Duration};

/// SSE feed of manager events. `events` is an optional comma-separated
/// allow-list of event names.
#[get("/api/v1/stream?<events>")]
pub fn live_stream(feed: &State<LiveFeed>, events: Option<&str>) -> EventStream![] {
    let mut rx = feed.sender.subscribe();
    let filter: Option<Vec<String>> = events.map(|s| {
        s.split(',')
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect()
    });

    EventStream! {
        let mut heartbeat = interval(Duration::from_secs(15));

        loop {
            tokio::select! {
                ev = rx.recv() => {
                    match ev {
                        Ok(ev) => {
                            if filter.as_ref().is_none_or(|f| f.contains(&ev.name)) {
                                yield Event::json(&ev.data).event(ev.name);
                            }
                        }
                        Err(RecvError::Lagged(n)) => {
                            warn!("SSE subscriber lagged, missed {n} events");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
                _ = heartbeat.tick() => {
                    let now = chrono::Utc::now().to_rfc3339();
                    yield Event::json(&serde_json::json!({"time": now})).event("heartbeat");
                }
            }
        }
    }
}
