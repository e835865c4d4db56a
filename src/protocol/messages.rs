// ABOUTME: Protocol envelope type definitions and serialization
// ABOUTME: Supports message, audio, join, leave and a catch-all unknown tag

use serde::{Deserialize, Serialize};

/// The unit of exchange over a room connection.
///
/// Envelopes are JSON objects discriminated by a `type` tag. Chat payloads
/// relay verbatim, so the `message` variant keeps every field other than the
/// tag in a pass-through map. `join`/`leave` are reserved for presence
/// notifications and currently do nothing; tags this server does not know are
/// parsed into [`Envelope::Unknown`] and ignored rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    /// Chat message, relayed verbatim to the rest of the room
    Message {
        /// Pass-through payload fields (everything except the tag)
        #[serde(flatten)]
        fields: serde_json::Map<String, serde_json::Value>,
    },

    /// Audio clip: base64-encoded WAV bytes, modulated before relay
    Audio {
        /// Base64 encoding of the WAV byte stream
        audio: String,
    },

    /// Reserved presence notification (no-op)
    Join,

    /// Reserved presence notification (no-op)
    Leave,

    /// Unrecognized tag, silently ignored
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_passthrough_fields() {
        let json = r#"{"type":"message","text":"hi","sender":"ghost"}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();

        match &envelope {
            Envelope::Message { fields } => {
                assert_eq!(fields["text"], "hi");
                assert_eq!(fields["sender"], "ghost");
            }
            other => panic!("expected message envelope, got {:?}", other),
        }

        // Re-serialization keeps the payload fields and the tag
        let out: serde_json::Value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(out["type"], "message");
        assert_eq!(out["text"], "hi");
        assert_eq!(out["sender"], "ghost");
    }

    #[test]
    fn test_audio_envelope() {
        let json = r#"{"type":"audio","audio":"UklGRg=="}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(
            envelope,
            Envelope::Audio {
                audio: "UklGRg==".to_string()
            }
        );
    }

    #[test]
    fn test_join_and_leave() {
        assert_eq!(
            serde_json::from_str::<Envelope>(r#"{"type":"join"}"#).unwrap(),
            Envelope::Join
        );
        assert_eq!(
            serde_json::from_str::<Envelope>(r#"{"type":"leave"}"#).unwrap(),
            Envelope::Leave
        );
    }

    #[test]
    fn test_unknown_tag() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"type":"typing","user":"x"}"#).unwrap();
        assert_eq!(envelope, Envelope::Unknown);
    }
}
