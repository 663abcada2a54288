//! Stern-Halma Server - HTTP API for game clients
//!
//! This crate provides the web backend:
//! - Player registration and login
//! - Game registry: create, join, start, move
//! - Long-polled move and turn events per watcher
//! - Static file serving for the browser client

mod events;
mod routes;
mod state;

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir};

pub use events::{event_queue, EventReceiver, QueueObserver};
pub use state::{GameRegistry, Player, PlayerRegistry, RegistryError, ServerState, SharedGame};

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
    /// Seed for drawing the first color; entropy when unset
    pub seed: Option<u64>,
    /// Events buffered per watcher before it is dropped
    pub event_capacity: usize,
    pub poll_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            static_dir: "static".to_string(),
            seed: None,
            event_capacity: 64,
            poll_timeout_ms: 5000,
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Board geometry
        .route("/api/board", get(routes::board::get_board))
        // Players
        .route("/api/players/register", post(routes::players::register))
        .route("/api/players/login", post(routes::players::login))
        // Games
        .route(
            "/api/games",
            get(routes::games::list_games).post(routes::games::create_game),
        )
        .route("/api/games/:id", get(routes::games::get_game))
        .route("/api/games/:id/fields", get(routes::games::get_fields))
        .route("/api/games/:id/turn", get(routes::games::get_turn))
        .route("/api/games/:id/join", post(routes::games::join_game))
        .route("/api/games/:id/start", post(routes::games::start_game))
        .route("/api/games/:id/move", post(routes::games::make_move))
        .route("/api/games/:id/moves", get(routes::games::get_destinations))
        // Watchers
        .route("/api/games/:id/watch", post(routes::watch::watch_game))
        .route("/api/games/:id/events", get(routes::watch::poll_events))
        .route(
            "/api/games/:id/watch/:watcher",
            delete(routes::watch::unwatch_game),
        )
        // Shared state
        .with_state(state)
        .layer(CorsLayer::permissive())
        // Static file serving (must be last)
        .fallback_service(static_service)
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::with_config(&config));
    let router = create_router(&config, state);

    tracing::info!("Stern-Halma server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("Static files served from: {}", config.static_dir);
    match config.seed {
        Some(seed) => tracing::info!("Start order seeded with {}", seed),
        None => tracing::info!("Start order seeded from entropy"),
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
