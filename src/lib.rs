// ABOUTME: Main library entry point for shadowrelay
// ABOUTME: Exports the relay server, room registry, protocol and audio pipeline

//! # shadowrelay
//!
//! Real-time room relay server: clients join named rooms over a WebSocket
//! connection and exchange text chat messages and short audio clips. Audio
//! clips pass through a deterministic voice-masking modulation (pitch-lowered,
//! robotic delay overlay) before being relayed to the rest of the room.
//!
//! ## Example: Running a Server
//!
//! ```no_run
//! use shadowrelay::server::{RelayServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default()
//!         .bind_addr("0.0.0.0:8000".parse().unwrap())
//!         .allowed_origins(vec!["http://localhost:3000".to_string()]);
//!
//!     RelayServer::with_config(config).run().await.unwrap();
//! }
//! ```

#![warn(missing_docs)]

/// Audio decoding, encoding and modulation
pub mod audio;
/// Protocol envelope types for WebSocket communication
pub mod protocol;
/// Server implementation: registry, broadcaster, connection handling
pub mod server;

pub use audio::{AudioBuffer, Modulator, WavCodec};
pub use protocol::Envelope;
pub use server::{Broadcaster, RelayServer, RoomRegistry, ServerConfig};

/// Result type for shadowrelay operations
pub type Result<T> = std::result::Result<T, error::Error>;

/// Error types for shadowrelay
pub mod error {
    use thiserror::Error;

    /// Error types for shadowrelay operations
    #[derive(Error, Debug)]
    pub enum Error {
        /// Handshake rejected (origin not allow-listed or upgrade failure)
        #[error("handshake rejected: {0}")]
        Handshake(String),

        /// Malformed audio container or corrupt transport encoding
        #[error("audio decode error: {0}")]
        Decode(String),

        /// Degenerate audio buffer handed to the modulator
        #[error("audio modulation error: {0}")]
        Modulation(String),

        /// Send failure for a single broadcast recipient
        #[error("delivery failed for connection {0}")]
        Delivery(String),

        /// Transport-level disconnect
        #[error("connection closed: {0}")]
        Disconnected(String),
    }
}
