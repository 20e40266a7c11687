pub mod clock;
pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod manager;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod stats;
pub mod store;
pub mod transport;
pub mod typing;

use clock::SystemClock;
use config::{Config, StoreKind};
use directory::UserDirectory;
use events::{LiveFeed, callback};
use log::{error, info};
use manager::LiveStateManager;
use rate_limit::RateLimiter;
use rocket::fairing::AdHoc;
use rocket_cors::CorsOptions;
use routes::Sessions;
use std::sync::Arc;
use store::{MemoryStore, SqliteStore, Storage};
use transport::{ChangeTransport, NullTransport};

pub fn rocket() -> rocket::Rocket<rocket::Build> {
    rocket_with_config(Config::from_env())
}

pub fn rocket_with_config(config: Config) -> rocket::Rocket<rocket::Build> {
    let manager = Arc::new(build_manager(&config, open_store(&config), Arc::new(NullTransport)));
    rocket_with_manager(config, manager)
}

/// Open the store `config` asks for. A store that fails to open is reported
/// and treated as unavailable.
pub fn open_store(config: &Config) -> Option<Arc<dyn Storage>> {
    match config.store {
        StoreKind::Sqlite => match SqliteStore::open(&config.database_path) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                error!("failed to open {}: {e}; running without persistence", config.database_path);
                None
            }
        },
        StoreKind::Memory => Some(Arc::new(MemoryStore::new())),
        StoreKind::None => None,
    }
}

pub fn build_manager(
    config: &Config,
    store: Option<Arc<dyn Storage>>,
    transport: Arc<dyn ChangeTransport>,
) -> LiveStateManager {
    LiveStateManager::new(store, Arc::new(SystemClock), transport)
        .with_typing_stale_ms(config.typing_stale_ms)
}

/// Mount the HTTP API around an existing manager. Managers built on one store
/// and one transport behave like tabs of the same origin.
pub fn rocket_with_manager(
    config: Config,
    manager: Arc<LiveStateManager>,
) -> rocket::Rocket<rocket::Build> {
    let feed = LiveFeed::new();
    for name in events::ALL_EVENTS {
        let feed = feed.clone();
        manager.on(name, callback(move |data| feed.publish(name, data)));
    }

    info!(
        "live state: store {:?} ({}), typing stale after {} ms",
        config.store, config.database_path, config.typing_stale_ms
    );

    let cors = CorsOptions::default()
        .to_cors()
        .expect("Failed to create CORS");

    let background = manager.clone();
    let stats_interval = config.stats_interval_secs;
    let presence_window = config.presence_window_secs;

    rocket::build()
        .manage(manager)
        .manage(feed)
        .manage(UserDirectory::seeded())
        .manage(Sessions::default())
        .manage(RateLimiter::new())
        .manage(config.rate_limits.clone())
        .attach(cors)
        .attach(AdHoc::on_liftoff("Live state tasks", move |_| {
            Box::pin(async move {
                tokio::spawn(background.clone().run_change_listener());
                stats::spawn_stats_task(background, stats_interval, presence_window);
            })
        }))
        .register(
            "/",
            rocket::catchers![
                routes::unauthorized,
                routes::forbidden,
                routes::too_many_requests,
                routes::not_found
            ],
        )
        .mount(
            "/",
            rocket::routes![
                routes::health,
                routes::stats,
                routes::login,
                routes::logout,
                routes::me,
                routes::get_dashboard,
                routes::list_users,
                routes::update_status,
                routes::remove_user,
                routes::get_messages,
                routes::send_message,
                routes::notify_typing,
                routes::get_typing,
                routes::list_announcements,
                routes::create_announcement,
                routes::live_stream,
            ],
        )
}
