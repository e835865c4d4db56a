// ABOUTME: Server configuration
// ABOUTME: Policy knobs for the relay: bind address, path, origins, size limit

use std::net::SocketAddr;

/// Default maximum inbound message size (bounds oversized audio payloads)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// WebSocket endpoint path prefix; rooms attach at `<prefix>/{room_id}`
    pub ws_path: String,
    /// Origins allowed to establish connections. Empty means unrestricted;
    /// requests without an Origin header (non-browser clients) always pass.
    pub allowed_origins: Vec<String>,
    /// Maximum inbound message size in bytes; larger frames close the
    /// connection with a protocol error
    pub max_message_bytes: usize,
}

impl ServerConfig {
    /// Set the bind address
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set the WebSocket path prefix
    pub fn ws_path(mut self, path: impl Into<String>) -> Self {
        self.ws_path = path.into();
        self
    }

    /// Set the origin allow-list
    pub fn allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Set the maximum inbound message size in bytes
    pub fn max_message_bytes(mut self, bytes: usize) -> Self {
        self.max_message_bytes = bytes;
        self
    }

    /// Whether a request with the given Origin header may connect
    pub fn origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        match origin {
            Some(origin) => self.allowed_origins.iter().any(|o| o == origin),
            None => true,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".parse().unwrap(),
            ws_path: "/ws".to_string(),
            allowed_origins: Vec::new(),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_allow_list_is_unrestricted() {
        let config = ServerConfig::default();
        assert!(config.origin_allowed(Some("https://anywhere.example")));
        assert!(config.origin_allowed(None));
    }

    #[test]
    fn test_allow_list_filters_origins() {
        let config = ServerConfig::default()
            .allowed_origins(vec!["http://localhost:3000".to_string()]);

        assert!(config.origin_allowed(Some("http://localhost:3000")));
        assert!(!config.origin_allowed(Some("https://evil.example")));
        // Non-browser clients carry no Origin header
        assert!(config.origin_allowed(None));
    }
}
