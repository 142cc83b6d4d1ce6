use serde::{Deserialize, Serialize};

/// One immutable now-playing record, captured at a point in time.
///
/// All four fields are always present on the wire; values the platform did
/// not report are normalized to the empty string at construction, never
/// `null` or omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub package: String,
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl TrackSnapshot {
    /// Build a snapshot from raw platform metadata, defaulting absent
    /// fields to the empty string.
    pub fn from_parts(
        package: &str,
        title: Option<String>,
        artist: Option<String>,
        album: Option<String>,
    ) -> Self {
        Self {
            package: package.to_string(),
            title: title.unwrap_or_default(),
            artist: artist.unwrap_or_default(),
            album: album.unwrap_or_default(),
        }
    }

    /// Encode as the single-line wire form (JSON object, no trailing
    /// newline; the writer appends the terminator).
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse one wire line back into a snapshot.
    pub fn decode(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Reported playback state of a platform session.
///
/// Only `Playing` participates in active-session selection; backend
/// failures while querying the state collapse to `Unknown` so the
/// selection scan stays total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
    Unknown,
}

/// Payload delivered by the platform notification source.
///
/// The event trigger only reacts to payloads carrying the media-session
/// marker; everything else is filtered before resolution.
#[derive(Clone, Debug)]
pub struct NotificationEvent {
    /// Package that posted the notification (may be empty when the source
    /// cannot attribute it).
    pub package: String,
    /// Set when the notification is backed by a platform media session.
    pub media_session: bool,
}

impl NotificationEvent {
    pub fn media_session(package: &str) -> Self {
        Self {
            package: package.to_string(),
            media_session: true,
        }
    }

    pub fn other(package: &str) -> Self {
        Self {
            package: package.to_string(),
            media_session: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_normalize_to_empty() {
        let snap = TrackSnapshot::from_parts("com.example.player", None, None, None);
        assert_eq!(snap.package, "com.example.player");
        assert_eq!(snap.title, "");
        assert_eq!(snap.artist, "");
        assert_eq!(snap.album, "");
    }

    #[test]
    fn test_encode_field_order_and_shape() {
        let snap = TrackSnapshot::from_parts(
            "B",
            Some("Song".into()),
            Some("Band".into()),
            Some("LP".into()),
        );
        assert_eq!(
            snap.encode().unwrap(),
            r#"{"package":"B","title":"Song","artist":"Band","album":"LP"}"#
        );
    }

    #[test]
    fn test_round_trip_arbitrary_text() {
        let cases = [
            TrackSnapshot::from_parts("", None, None, None),
            TrackSnapshot::from_parts(
                "org.mpris.spotify",
                Some("Träume — 夢".into()),
                Some("Ünïcode \"Band\"".into()),
                Some("LP\nwith newline".into()),
            ),
        ];
        for snap in cases {
            let line = snap.encode().unwrap();
            assert!(!line.contains('\n'), "encoded line must stay single-line");
            assert_eq!(TrackSnapshot::decode(&line).unwrap(), snap);
        }
    }
}
