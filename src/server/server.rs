// ABOUTME: Main relay server implementation
// ABOUTME: Provides the WebSocket endpoint and wires registry and broadcaster together

use crate::server::broadcaster::Broadcaster;
use crate::server::config::ServerConfig;
use crate::server::connection::handle_connection;
use crate::server::registry::RoomRegistry;
use axum::{
    extract::ws::WebSocketUpgrade,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// Room registry
    pub registry: RoomRegistry,
    /// Room broadcaster
    pub broadcaster: Broadcaster,
}

/// Shadowrelay server
pub struct RelayServer {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// Room registry
    registry: RoomRegistry,
    /// Room broadcaster
    broadcaster: Broadcaster,
}

impl RelayServer {
    /// Create a new relay server with default configuration
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Create a new relay server with custom configuration
    pub fn with_config(config: ServerConfig) -> Self {
        let registry = RoomRegistry::new();
        let broadcaster = Broadcaster::new(registry.clone());
        Self {
            config: Arc::new(config),
            registry,
            broadcaster,
        }
    }

    /// Get the server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the room registry
    pub fn registry(&self) -> RoomRegistry {
        self.registry.clone()
    }

    /// Run the server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let config = self.config.clone();

        let state = AppState {
            config: config.clone(),
            registry: self.registry,
            broadcaster: self.broadcaster,
        };

        // Build router: rooms attach at <prefix>/{room_id}
        let route = format!("{}/{{room_id}}", config.ws_path);
        let app = Router::new().route(&route, any(ws_handler)).with_state(state);

        // Bind and serve
        let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
        log::info!(
            "shadowrelay listening on {} (endpoint: {}/{{room_id}})",
            config.bind_addr,
            config.ws_path
        );

        // Setup graceful shutdown
        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for Ctrl-C");
            log::info!("Received shutdown signal");
        };

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await?;

        log::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for RelayServer {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket upgrade handler: enforces the origin allow-list and the message
/// size limit, then hands the socket to the per-connection task.
async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());

    if !state.config.origin_allowed(origin) {
        log::warn!(
            "rejecting connection to room {} from disallowed origin {:?}",
            room_id,
            origin
        );
        return StatusCode::FORBIDDEN.into_response();
    }

    ws.max_message_size(state.config.max_message_bytes)
        .on_upgrade(move |socket| {
            handle_connection(socket, room_id, state.registry, state.broadcaster)
        })
        .into_response()
}
