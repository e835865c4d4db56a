// ABOUTME: Shared CLI argument parsing and server builder utilities
// ABOUTME: Maps command-line flags and the PORT environment variable to ServerConfig

use crate::server::ServerConfig;
use clap::Args;
use std::net::{IpAddr, SocketAddr};

/// Fallback port when neither `--port` nor `PORT` is set
const DEFAULT_PORT: u16 = 8000;

/// Common server arguments
///
/// Use with `#[command(flatten)]` in your binary's Args struct:
/// ```ignore
/// #[derive(Parser)]
/// struct MyArgs {
///     #[command(flatten)]
///     server: ServerArgs,
/// }
/// ```
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Address to bind the server to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Listening port (falls back to the PORT environment variable, then 8000)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// WebSocket endpoint path prefix
    #[arg(long, default_value = "/ws")]
    pub path: String,

    /// Origin allowed to connect (repeatable; no flag means any origin)
    #[arg(long = "origin")]
    pub origins: Vec<String>,

    /// Maximum inbound message size in MiB
    #[arg(long, default_value = "16")]
    pub max_message_mib: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerArgs {
    /// Initialize tracing based on verbosity flag
    pub fn init_tracing(&self) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let filter = if self.verbose {
            "shadowrelay=debug,tower_http=debug"
        } else {
            "shadowrelay=info"
        };

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| filter.into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Log startup information
    pub fn log_startup_info(&self) {
        tracing::info!("Shadowrelay Server v{}", env!("CARGO_PKG_VERSION"));
        tracing::info!("Bind: {}", self.bind_addr());
        tracing::info!("Endpoint: ws://{}{}/{{room_id}}", self.bind_addr(), self.path);
        if self.origins.is_empty() {
            tracing::info!("Origins: unrestricted");
        } else {
            tracing::info!("Origins: {:?}", self.origins);
        }
    }

    /// Resolve the listening port: `--port`, then `PORT` env var, then 8000
    pub fn resolve_port(&self) -> u16 {
        self.port.unwrap_or_else(|| {
            std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT)
        })
    }

    /// The resolved socket address to bind
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.resolve_port())
    }

    /// Build ServerConfig from these args
    pub fn build_config(&self) -> ServerConfig {
        ServerConfig::default()
            .bind_addr(self.bind_addr())
            .ws_path(self.path.clone())
            .allowed_origins(self.origins.clone())
            .max_message_bytes(self.max_message_mib * 1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServerArgs {
        ServerArgs {
            host: "0.0.0.0".parse().unwrap(),
            port: None,
            path: "/ws".to_string(),
            origins: Vec::new(),
            max_message_mib: 16,
            verbose: false,
        }
    }

    #[test]
    fn test_explicit_port_wins() {
        let mut args = args();
        args.port = Some(9100);
        assert_eq!(args.resolve_port(), 9100);
    }

    #[test]
    fn test_build_config() {
        let mut args = args();
        args.port = Some(9000);
        args.origins = vec!["http://localhost:3000".to_string()];
        args.max_message_mib = 4;

        let config = args.build_config();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.ws_path, "/ws");
        assert_eq!(config.allowed_origins.len(), 1);
        assert_eq!(config.max_message_bytes, 4 * 1024 * 1024);
    }
}
