// ABOUTME: Room broadcaster
// ABOUTME: Fans an envelope out to room members with optional sender exclusion

use crate::protocol::Envelope;
use crate::server::registry::RoomRegistry;

/// Fans envelopes out to every member of a room.
///
/// Delivery failures are isolated per recipient: a closed connection is
/// logged and skipped, never surfaced to the caller. For a single sender,
/// recipients observe envelopes in broadcast order (each member's outbound
/// channel is FIFO); nothing is guaranteed across senders racing concurrently.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: RoomRegistry,
}

impl Broadcaster {
    /// Create a broadcaster over a registry
    pub fn new(registry: RoomRegistry) -> Self {
        Self { registry }
    }

    /// Send an envelope to every member of a room except `exclude`.
    ///
    /// The member list is snapshotted before sending, so members joining or
    /// leaving mid-broadcast never disturb the send loop. Returns the number
    /// of recipients the envelope was queued for.
    pub fn broadcast(
        &self,
        room_id: &str,
        envelope: &Envelope,
        exclude: Option<&str>,
    ) -> usize {
        let json = match serde_json::to_string(envelope) {
            Ok(json) => json,
            Err(e) => {
                log::error!("failed to serialize envelope for room {}: {}", room_id, e);
                return 0;
            }
        };

        let members = self.registry.members(room_id);
        let mut delivered = 0;
        for member in &members {
            if exclude.is_some_and(|id| id == member.id) {
                continue;
            }
            match member.send(json.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    // Receiver already gone; its task will clean up membership
                    log::debug!(
                        "room {}: dropping envelope for closed connection {}",
                        room_id,
                        member.id
                    );
                }
            }
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::registry::ConnectionHandle;
    use tokio::sync::mpsc;

    fn member(
        registry: &RoomRegistry,
        room: &str,
    ) -> (ConnectionHandle, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new(tx);
        registry.join(room, handle.clone());
        (handle, rx)
    }

    fn chat(text: &str) -> Envelope {
        serde_json::from_str(&format!(r#"{{"type":"message","text":"{}"}}"#, text))
            .unwrap()
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let registry = RoomRegistry::new();
        let broadcaster = Broadcaster::new(registry.clone());

        let (a, mut a_rx) = member(&registry, "r1");
        let (_b, mut b_rx) = member(&registry, "r1");
        let (_c, mut c_rx) = member(&registry, "r1");

        let delivered = broadcaster.broadcast("r1", &chat("hi"), Some(&a.id));
        assert_eq!(delivered, 2);

        assert!(a_rx.try_recv().is_err());
        assert!(b_rx.try_recv().is_ok());
        assert!(c_rx.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_without_exclusion() {
        let registry = RoomRegistry::new();
        let broadcaster = Broadcaster::new(registry.clone());

        let (_a, mut a_rx) = member(&registry, "r1");
        let (_b, mut b_rx) = member(&registry, "r1");

        let delivered = broadcaster.broadcast("r1", &chat("all"), None);
        assert_eq!(delivered, 2);
        assert!(a_rx.try_recv().is_ok());
        assert!(b_rx.try_recv().is_ok());
    }

    #[test]
    fn test_closed_recipient_is_isolated() {
        let registry = RoomRegistry::new();
        let broadcaster = Broadcaster::new(registry.clone());

        let (_a, a_rx) = member(&registry, "r1");
        let (_b, mut b_rx) = member(&registry, "r1");

        // A's receive side is already gone
        drop(a_rx);

        let delivered = broadcaster.broadcast("r1", &chat("still here"), None);
        assert_eq!(delivered, 1);
        assert!(b_rx.try_recv().is_ok());
    }

    #[test]
    fn test_per_sender_ordering() {
        let registry = RoomRegistry::new();
        let broadcaster = Broadcaster::new(registry.clone());

        let (_b, mut b_rx) = member(&registry, "r1");

        broadcaster.broadcast("r1", &chat("first"), None);
        broadcaster.broadcast("r1", &chat("second"), None);

        let first = tokio_test::block_on(b_rx.recv()).unwrap();
        let second = tokio_test::block_on(b_rx.recv()).unwrap();
        assert!(first.contains("first"));
        assert!(second.contains("second"));
    }

    #[test]
    fn test_unknown_room_delivers_nothing() {
        let registry = RoomRegistry::new();
        let broadcaster = Broadcaster::new(registry);
        assert_eq!(broadcaster.broadcast("ghost-town", &chat("echo"), None), 0);
    }
}
