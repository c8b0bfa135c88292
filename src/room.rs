//! Room synchronization core: per-room playback/queue/participant state,
//! the per-room broadcast fan-out, and the process-wide registry.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use tokio::sync::{mpsc::UnboundedSender, RwLock};

use crate::{
    error::AppErr,
    protocol::ServerEvent,
    state::{now_ms, HistoryEntry, Participant, PlaybackState, RoomSnapshot, Track},
};

/// Room ids are short, shareable codes; collisions are retried at creation.
const ROOM_ID_LEN: usize = 6;

/* ------------ Broadcast fan-out ------------ */

/// Delivers a serialized event to every connection in one room.
///
/// Fire-and-forget: a closed receiver is skipped, never retried. Each
/// connection gets its own unbounded channel, so sends never block and each
/// member observes this room's broadcasts in the order they were issued.
#[derive(Default)]
pub struct Fanout {
    senders: HashMap<String, UnboundedSender<String>>,
}

impl Fanout {
    pub fn subscribe(&mut self, conn_id: &str, tx: UnboundedSender<String>) {
        self.senders.insert(conn_id.to_owned(), tx);
    }

    pub fn unsubscribe(&mut self, conn_id: &str) {
        self.senders.remove(conn_id);
    }

    pub fn publish(&self, event: &ServerEvent) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "dropping unserializable event");
                return;
            }
        };
        for tx in self.senders.values() {
            let _ = tx.send(text.clone());
        }
    }
}

/* ------------ Room ------------ */

#[derive(Default)]
pub struct Room {
    playback: PlaybackState,
    queue: VecDeque<Track>,
    participants: HashMap<String, Participant>,
    history: Vec<HistoryEntry>,
    fanout: Fanout,
}

impl Room {
    /// Registers (or overwrites) this connection's participant entry,
    /// announces the new roster, and returns the full room state.
    pub fn join(&mut self, conn_id: &str, name: &str, tx: UnboundedSender<String>) -> RoomSnapshot {
        self.participants.insert(
            conn_id.to_owned(),
            Participant { name: name.to_owned(), last_active: now_ms() },
        );
        self.fanout.subscribe(conn_id, tx);
        self.fanout.publish(&ServerEvent::Participants(self.participant_list()));
        self.snapshot()
    }

    /// Drops the connection if present. The roster is rebroadcast only when
    /// membership actually changed.
    pub fn remove_connection(&mut self, conn_id: &str) {
        let was_member = self.participants.remove(conn_id).is_some();
        self.fanout.unsubscribe(conn_id);
        if was_member {
            self.fanout.publish(&ServerEvent::Participants(self.participant_list()));
        }
    }

    /// Starts `track` at `played_seconds`, overriding whatever was playing.
    /// Every call appends to history and rebroadcasts; play is deliberately
    /// not idempotent.
    pub fn play(&mut self, track: Track, played_seconds: f64, user: &str) {
        self.playback = PlaybackState {
            current_track: Some(track.clone()),
            playing: true,
            played_seconds,
            last_player: Some(user.to_owned()),
            internal_seek: true,
        };
        self.history.push(HistoryEntry {
            track: track.clone(),
            user: user.to_owned(),
            timestamp: now_ms(),
        });
        self.fanout.publish(&ServerEvent::Play {
            track,
            played_seconds,
            user: user.to_owned(),
        });
    }

    pub fn pause(&mut self, played_seconds: f64) {
        self.playback.playing = false;
        self.playback.played_seconds = played_seconds;
        self.fanout.publish(&ServerEvent::Pause { played_seconds });
    }

    /// Moves the position without touching the play/pause state.
    pub fn seek(&mut self, played_seconds: f64) {
        self.playback.played_seconds = played_seconds;
        self.fanout.publish(&ServerEvent::Seek { played_seconds });
    }

    /// Pops the queue head and starts it from zero. Silent no-op on an
    /// empty queue: no state change, no broadcast.
    pub fn next(&mut self, user: &str) {
        let Some(track) = self.queue.pop_front() else { return };
        self.playback = PlaybackState {
            current_track: Some(track.clone()),
            playing: true,
            played_seconds: 0.0,
            last_player: Some(user.to_owned()),
            internal_seek: true,
        };
        self.history.push(HistoryEntry {
            track: track.clone(),
            user: user.to_owned(),
            timestamp: now_ms(),
        });
        self.fanout.publish(&ServerEvent::Play {
            track,
            played_seconds: 0.0,
            user: user.to_owned(),
        });
        self.fanout.publish(&ServerEvent::Queue(self.queue_list()));
    }

    pub fn queue_add(&mut self, track: Track) {
        self.queue.push_back(track);
        self.fanout.publish(&ServerEvent::Queue(self.queue_list()));
    }

    /// Removes every queued track with this id, keeping the rest in order.
    /// The full queue is rebroadcast even when nothing matched.
    pub fn queue_remove(&mut self, track_id: &str) {
        self.queue.retain(|t| t.id != track_id);
        self.fanout.publish(&ServerEvent::Queue(self.queue_list()));
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            playback: self.playback.clone(),
            queue: self.queue_list(),
            participants: self.participant_list(),
            history: self.history.clone(),
        }
    }

    fn participant_list(&self) -> Vec<Participant> {
        self.participants.values().cloned().collect()
    }

    fn queue_list(&self) -> Vec<Track> {
        self.queue.iter().cloned().collect()
    }
}

/* ------------ Registry ------------ */

/// All live rooms, keyed by id. Rooms are created on demand and live for the
/// process lifetime; there is no delete path and no idle expiry.
///
/// One map-wide write lock is held across each handler's whole
/// mutate-and-broadcast sequence, which keeps every room operation atomic
/// with respect to every other, matching the single-threaded model this
/// protocol assumes.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<RwLock<HashMap<String, Room>>>,
}

impl RoomRegistry {
    /// Installs an empty room under a fresh id. Never fails; an id collision
    /// just regenerates.
    pub async fn create(&self) -> String {
        let mut rooms = self.rooms.write().await;
        loop {
            let id = nanoid::nanoid!(ROOM_ID_LEN);
            if !rooms.contains_key(&id) {
                rooms.insert(id.clone(), Room::default());
                return id;
            }
        }
    }

    pub async fn get(&self, id: &str) -> Option<RoomSnapshot> {
        self.rooms.read().await.get(id).map(Room::snapshot)
    }

    /// Runs `f` on the room under the write lock. Unknown ids yield `None`,
    /// which every fire-and-forget handler treats as a silent no-op.
    pub async fn update<T>(&self, id: &str, f: impl FnOnce(&mut Room) -> T) -> Option<T> {
        self.rooms.write().await.get_mut(id).map(f)
    }

    pub async fn join(
        &self,
        id: &str,
        conn_id: &str,
        name: &str,
        tx: UnboundedSender<String>,
    ) -> Result<RoomSnapshot, AppErr> {
        self.update(id, |room| room.join(conn_id, name, tx))
            .await
            .ok_or(AppErr::RoomNotFound)
    }

    /// Disconnect cleanup. Membership is not tracked per connection, so this
    /// sweeps every room; only rooms that lost the participant rebroadcast
    /// their roster.
    pub async fn disconnect(&self, conn_id: &str) {
        let mut rooms = self.rooms.write().await;
        for room in rooms.values_mut() {
            room.remove_connection(conn_id);
        }
    }
}
