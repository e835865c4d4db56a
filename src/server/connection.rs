// ABOUTME: WebSocket connection handler
// ABOUTME: Per-connection read loop, envelope dispatch and registry cleanup

use crate::audio::{Modulator, WavCodec};
use crate::error::Error;
use crate::protocol::Envelope;
use crate::server::broadcaster::Broadcaster;
use crate::server::registry::{ConnectionHandle, ConnectionId, RoomRegistry};
use axum::extract::ws::{Message as WsMessage, WebSocket};
use base64::Engine;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

/// Handle one WebSocket connection for its whole lifetime.
///
/// Joins the room, forwards queued outbound envelopes to the socket from a
/// separate task, and runs the read loop until the transport drops. Registry
/// cleanup runs unconditionally after the loop, whatever ended it, so a dead
/// connection never leaves orphaned membership behind.
pub async fn handle_connection(
    socket: WebSocket,
    room_id: String,
    registry: RoomRegistry,
    broadcaster: Broadcaster,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = ConnectionHandle::new(tx);
    let conn_id = handle.id.clone();

    registry.join(&room_id, handle);
    log::info!("connection {} joined room {}", conn_id, room_id);

    // Forward queued envelopes to the socket
    let conn_id_send = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
                log::debug!("connection {} disconnected (send failed)", conn_id_send);
                break;
            }
        }
    });

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(WsMessage::Text(text)) => {
                handle_text(text.as_str(), &conn_id, &room_id, &broadcaster);
            }
            Ok(WsMessage::Binary(data)) => {
                // Audio travels base64-encoded inside text envelopes
                log::debug!(
                    "connection {}: ignoring {} binary bytes",
                    conn_id,
                    data.len()
                );
            }
            Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => {
                // Handled automatically by axum
            }
            Ok(WsMessage::Close(_)) => {
                log::info!("connection {} closed", conn_id);
                break;
            }
            Err(e) => {
                log::warn!("websocket error for connection {}: {}", conn_id, e);
                break;
            }
        }
    }

    registry.leave(&room_id, &conn_id);
    send_task.abort();
    log::info!("connection {} left room {}", conn_id, room_id);
}

/// Parse one inbound text frame and dispatch it. Unparseable frames are
/// dropped; the relay is best-effort, not a strict protocol.
fn handle_text(text: &str, sender: &ConnectionId, room_id: &str, broadcaster: &Broadcaster) {
    let envelope = match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            log::warn!(
                "connection {}: dropping unparseable envelope: {}",
                sender,
                e
            );
            return;
        }
    };

    handle_envelope(envelope, sender, room_id, broadcaster);
}

/// Dispatch one envelope by its type tag.
///
/// Chat messages relay verbatim and audio clips are modulated before relay,
/// both excluding the sender. Decode or modulation failures drop the one
/// offending message and leave the connection up. `join`/`leave` are reserved
/// presence placeholders and unknown tags are ignored outright.
pub fn handle_envelope(
    envelope: Envelope,
    sender: &ConnectionId,
    room_id: &str,
    broadcaster: &Broadcaster,
) {
    match envelope {
        Envelope::Message { .. } => {
            broadcaster.broadcast(room_id, &envelope, Some(sender));
        }
        Envelope::Audio { audio } => match modulate_clip(&audio) {
            Ok(audio) => {
                broadcaster.broadcast(room_id, &Envelope::Audio { audio }, Some(sender));
            }
            Err(e) => {
                log::warn!(
                    "connection {}: dropping audio envelope for room {}: {}",
                    sender,
                    room_id,
                    e
                );
            }
        },
        Envelope::Join | Envelope::Leave => {
            // Reserved for presence notifications
        }
        Envelope::Unknown => {
            log::debug!("connection {}: ignoring unknown envelope type", sender);
        }
    }
}

/// Run one audio payload through the modulation pipeline:
/// base64 -> WAV decode -> modulate -> WAV encode -> base64.
fn modulate_clip(audio_b64: &str) -> crate::Result<String> {
    let engine = base64::engine::general_purpose::STANDARD;
    let bytes = engine
        .decode(audio_b64)
        .map_err(|e| Error::Decode(format!("corrupt base64: {}", e)))?;

    let buffer = WavCodec::decode(&bytes)?;
    let modulated = Modulator::apply(&buffer)?;
    let encoded = WavCodec::encode(&modulated)?;

    Ok(engine.encode(encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modulate_clip_rejects_bad_base64() {
        let err = modulate_clip("!!! not base64 !!!").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_modulate_clip_rejects_bad_container() {
        let engine = base64::engine::general_purpose::STANDARD;
        let payload = engine.encode(b"not a wav file at all");
        let err = modulate_clip(&payload).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
