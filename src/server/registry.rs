// ABOUTME: Room registry
// ABOUTME: Thread-safe map of room keys to ordered member connection lists

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Unique connection identifier
pub type ConnectionId = String;

/// Handle to one live connection: its identity plus the channel used to
/// queue outbound envelope JSON for its WebSocket task.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    /// Unique connection identifier
    pub id: ConnectionId,
    /// Channel to the connection's outbound forward task
    pub tx: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    /// Create a handle with a fresh identifier
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tx,
        }
    }

    /// Queue a serialized envelope for this connection
    pub fn send(&self, text: String) -> Result<(), mpsc::error::SendError<String>> {
        self.tx.send(text)
    }
}

/// Thread-safe registry of rooms and their member connections.
///
/// Rooms are ephemeral: an entry is created on first join and deleted as soon
/// as the last member leaves, so an empty room never persists. Member order is
/// join order. One coarse lock guards the whole map; sends never happen under
/// it (callers broadcast over a [`members`](RoomRegistry::members) snapshot).
#[derive(Debug)]
pub struct RoomRegistry {
    /// Map of room key to ordered member list
    rooms: Arc<RwLock<HashMap<String, Vec<ConnectionHandle>>>>,
}

impl RoomRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a connection under a room, creating the room entry if absent.
    /// Joining a room the connection is already in is a no-op.
    pub fn join(&self, room_id: &str, handle: ConnectionHandle) {
        let mut rooms = self.rooms.write();
        let members = rooms.entry(room_id.to_string()).or_default();
        if members.iter().any(|m| m.id == handle.id) {
            return;
        }
        members.push(handle);
        log::info!(
            "room {}: member joined, occupancy {}",
            room_id,
            members.len()
        );
    }

    /// Remove a connection from a room, deleting the room entry if it empties.
    /// Leaving a room the connection is not in is a no-op, so disconnect
    /// cleanup is safe even when the join partially failed.
    pub fn leave(&self, room_id: &str, conn_id: &str) {
        let mut rooms = self.rooms.write();
        if let Some(members) = rooms.get_mut(room_id) {
            members.retain(|m| m.id != conn_id);
            let occupancy = members.len();
            if occupancy == 0 {
                rooms.remove(room_id);
                log::info!("room {}: last member left, room removed", room_id);
            } else {
                log::info!("room {}: member left, occupancy {}", room_id, occupancy);
            }
        }
    }

    /// Point-in-time snapshot of a room's members, in join order.
    /// Returns an empty list for an unknown room.
    pub fn members(&self, room_id: &str) -> Vec<ConnectionHandle> {
        self.rooms
            .read()
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a room currently exists
    pub fn contains(&self, room_id: &str) -> bool {
        self.rooms.read().contains_key(room_id)
    }

    /// Number of members in a room (0 for an unknown room)
    pub fn member_count(&self, room_id: &str) -> usize {
        self.rooms.read().get(room_id).map_or(0, |m| m.len())
    }

    /// All currently live room keys
    pub fn room_ids(&self) -> Vec<String> {
        self.rooms.read().keys().cloned().collect()
    }

    /// Number of currently live rooms
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RoomRegistry {
    fn clone(&self) -> Self {
        Self {
            rooms: Arc::clone(&self.rooms),
        }
    }
}
