// ABOUTME: Server module for the shadowrelay service
// ABOUTME: Provides the WebSocket server, room registry and broadcast fan-out

mod broadcaster;
mod cli;
mod config;
mod connection;
mod registry;
mod server;

pub use broadcaster::Broadcaster;
pub use cli::ServerArgs;
pub use config::{ServerConfig, DEFAULT_MAX_MESSAGE_BYTES};
pub use connection::{handle_connection, handle_envelope};
pub use registry::{ConnectionHandle, ConnectionId, RoomRegistry};
pub use server::RelayServer;
