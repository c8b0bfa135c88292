//! Wire protocol: one JSON object per WebSocket text frame, shaped as
//! `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use crate::state::{Participant, RoomSnapshot, Track};

/* ------------ client -> server ------------ */

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Request: answered with a fresh room id.
    CreateRoom { user: String },
    /// Request: answered with the room snapshot, or `Room not found`.
    JoinRoom { room_id: String, user: String },
    Play {
        room_id: String,
        track: Track,
        played_seconds: f64,
        user: String,
    },
    Pause { room_id: String, played_seconds: f64 },
    Seek { room_id: String, played_seconds: f64 },
    Next { room_id: String, user: String },
    /// Reserved until a played-history stack exists; currently a no-op.
    Prev { room_id: String, user: String },
    #[serde(rename = "queue:add")]
    QueueAdd {
        room_id: String,
        track: Track,
        user: String,
    },
    #[serde(rename = "queue:remove")]
    QueueRemove { room_id: String, track_id: String },
    /// Request: full-state pull for late joiners and recovery.
    Sync { room_id: String },
}

/* ------------ server -> client ------------ */

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    #[serde(rename = "createRoom")]
    RoomCreated { room_id: String },
    #[serde(rename = "joinRoom")]
    RoomJoined(JoinReply),
    Play {
        track: Track,
        played_seconds: f64,
        user: String,
    },
    Pause { played_seconds: f64 },
    Seek { played_seconds: f64 },
    Queue(Vec<Track>),
    Participants(Vec<Participant>),
    Sync(RoomSnapshot),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JoinReply {
    Room { room: RoomSnapshot },
    Error { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(id: &str) -> Track {
        Track {
            id: id.into(),
            title: format!("title-{id}"),
            channel: "channel".into(),
            thumbnail: String::new(),
            duration_seconds: 210,
        }
    }

    #[test]
    fn decodes_camel_case_play_event() {
        let ev: ClientEvent = serde_json::from_value(json!({
            "event": "play",
            "data": {
                "roomId": "abc123",
                "track": { "id": "t1", "title": "title-t1" },
                "playedSeconds": 4.5,
                "user": "A"
            }
        }))
        .unwrap();
        match ev {
            ClientEvent::Play { room_id, track, played_seconds, user } => {
                assert_eq!(room_id, "abc123");
                assert_eq!(track.id, "t1");
                assert_eq!(played_seconds, 4.5);
                assert_eq!(user, "A");
            }
            other => panic!("decoded {other:?}"),
        }
    }

    #[test]
    fn decodes_namespaced_queue_events() {
        let add: ClientEvent = serde_json::from_value(json!({
            "event": "queue:add",
            "data": { "roomId": "r", "track": { "id": "t2", "title": "x" }, "user": "B" }
        }))
        .unwrap();
        assert!(matches!(add, ClientEvent::QueueAdd { .. }));

        let remove: ClientEvent = serde_json::from_value(json!({
            "event": "queue:remove",
            "data": { "roomId": "r", "trackId": "t2" }
        }))
        .unwrap();
        assert_eq!(
            remove,
            ClientEvent::QueueRemove { room_id: "r".into(), track_id: "t2".into() }
        );
    }

    #[test]
    fn sparse_track_metadata_is_accepted() {
        let ev: ClientEvent = serde_json::from_value(json!({
            "event": "queue:add",
            "data": { "roomId": "r", "track": { "id": "t3", "title": "bare" }, "user": "B" }
        }))
        .unwrap();
        let ClientEvent::QueueAdd { track, .. } = ev else { panic!() };
        assert_eq!(track.channel, "");
        assert_eq!(track.duration_seconds, 0);
    }

    #[test]
    fn broadcast_events_keep_their_wire_names() {
        let pause = serde_json::to_value(ServerEvent::Pause { played_seconds: 12.5 }).unwrap();
        assert_eq!(pause, json!({ "event": "pause", "data": { "playedSeconds": 12.5 } }));

        let queue = serde_json::to_value(ServerEvent::Queue(vec![track("t1")])).unwrap();
        assert_eq!(queue["event"], "queue");
        assert_eq!(queue["data"][0]["id"], "t1");
        assert_eq!(queue["data"][0]["durationSeconds"], 210);
    }

    #[test]
    fn join_replies_share_the_request_name() {
        let err =
            serde_json::to_value(ServerEvent::RoomJoined(JoinReply::Error {
                error: "Room not found".into(),
            }))
            .unwrap();
        assert_eq!(err, json!({ "event": "joinRoom", "data": { "error": "Room not found" } }));
    }

    #[test]
    fn room_id_reply_is_camel_cased() {
        let created =
            serde_json::to_value(ServerEvent::RoomCreated { room_id: "xyz789".into() }).unwrap();
        assert_eq!(created, json!({ "event": "createRoom", "data": { "roomId": "xyz789" } }));
    }
}
