use serde::{Deserialize, Serialize};

/* ------------ Tracks & participants ------------ */

/// A track as supplied by the client, usually straight from a search result.
/// The server treats the metadata as opaque; identity is the external id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub last_active: i64, // epoch millis
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub track: Track,
    pub user: String,
    pub timestamp: i64,
}

/* ------------ Playback state ------------ */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub playing: bool,
    pub played_seconds: f64,
    pub last_player: Option<String>,
    /// Marks server-originated position updates so a client can tell them
    /// apart from its own user's seeks and avoid a feedback loop.
    pub internal_seek: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_track: None,
            playing: false,
            played_seconds: 0.0,
            last_player: None,
            internal_seek: true,
        }
    }
}

/// Full room state, as handed to `joinRoom` and `sync` callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub playback: PlaybackState,
    pub queue: Vec<Track>,
    pub participants: Vec<Participant>,
    pub history: Vec<HistoryEntry>,
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
