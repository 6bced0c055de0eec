use std::sync::Arc;
use tokio::signal;
use tracing::info;

use tally_persistence::connection::connect_and_migrate;
use tally_persistence::repositories::{ProfileRepository, SharedBoardRepository};
use tally_persistence::{BoardStore, ProfileStore};
use tally_core::{BoardEvent, BoardEventHandler};
use tally_server::{
    broadcast::BroadcastHub, config::Config, create_routes, session::SessionManager,
};

struct EventLogger;

impl BoardEventHandler for EventLogger {
    fn handle_event(&mut self, event: BoardEvent) {
        info!(?event, "board event");
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting tally server...");

    let config = Config::new();

    // Initialize database connection and run migrations
    let db = match connect_and_migrate().await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to connect to database and run migrations: {}", e);
            std::process::exit(1);
        }
    };

    let board_store: Arc<dyn BoardStore> = Arc::new(SharedBoardRepository::new(db.clone()));
    let profile_store: Arc<dyn ProfileStore> = Arc::new(ProfileRepository::new(db));

    let hub = Arc::new(BroadcastHub::new(config.snapshot_channel_capacity));
    let session = Arc::new(
        SessionManager::bootstrap(profile_store, board_store, hub.clone()).await,
    );

    session.register_event_handler(Box::new(EventLogger));

    let user = session.current_user().await;
    info!("Profile identity: {} ({})", user.name, user.id);

    let routes = create_routes(session.clone(), hub.clone(), config.clone());

    // Periodically drop snapshot channels nobody subscribes to anymore
    let prune_hub = hub.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            prune_hub.prune_idle();
        }
    });

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().unwrap(),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).unwrap();
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).unwrap();

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
