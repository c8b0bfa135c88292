//! Connection gateway: one WebSocket session per client, routing named
//! events to the room core. Request/response events (`createRoom`,
//! `joinRoom`, `sync`) are answered directly on the caller's socket;
//! everything else is observed only through room broadcasts.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::{
    protocol::{ClientEvent, JoinReply, ServerEvent},
    room::RoomRegistry,
};

pub fn router() -> Router {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(rooms): Extension<RoomRegistry>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_session(socket, rooms))
}

/* ---------------- per connection ---------------- */

async fn client_session(socket: WebSocket, rooms: RoomRegistry) {
    let conn_id = nanoid::nanoid!();
    let (mut sink, mut stream) = socket.split();

    // Single writer task: both direct replies and room broadcasts funnel
    // through this channel, so frame order matches issue order.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    debug!(%conn_id, "client connected");
    while let Some(Ok(msg)) = stream.next().await {
        let Message::Text(raw) = msg else { continue };
        match serde_json::from_str::<ClientEvent>(&raw) {
            Ok(event) => handle_event(&rooms, &conn_id, &tx, event).await,
            Err(e) => debug!(%conn_id, error = %e, "ignoring malformed frame"),
        }
    }

    // Disconnect is the only cleanup signal; sweep the room set.
    rooms.disconnect(&conn_id).await;
    writer.abort();
    debug!(%conn_id, "client disconnected");
}

async fn handle_event(
    rooms: &RoomRegistry,
    conn_id: &str,
    tx: &UnboundedSender<String>,
    event: ClientEvent,
) {
    match event {
        ClientEvent::CreateRoom { user } => {
            let room_id = rooms.create().await;
            info!(%room_id, %user, "room created");
            reply(tx, &ServerEvent::RoomCreated { room_id });
        }
        ClientEvent::JoinRoom { room_id, user } => {
            let ack = match rooms.join(&room_id, conn_id, &user, tx.clone()).await {
                Ok(room) => ServerEvent::RoomJoined(JoinReply::Room { room }),
                Err(e) => ServerEvent::RoomJoined(JoinReply::Error { error: e.to_string() }),
            };
            reply(tx, &ack);
        }
        ClientEvent::Play { room_id, track, played_seconds, user } => {
            let _ = rooms
                .update(&room_id, |room| room.play(track, played_seconds, &user))
                .await;
        }
        ClientEvent::Pause { room_id, played_seconds } => {
            let _ = rooms.update(&room_id, |room| room.pause(played_seconds)).await;
        }
        ClientEvent::Seek { room_id, played_seconds } => {
            let _ = rooms.update(&room_id, |room| room.seek(played_seconds)).await;
        }
        ClientEvent::Next { room_id, user } => {
            let _ = rooms.update(&room_id, |room| room.next(&user)).await;
        }
        // No played-history stack yet, so prev has no observable effect.
        ClientEvent::Prev { .. } => {}
        ClientEvent::QueueAdd { room_id, track, user: _ } => {
            let _ = rooms.update(&room_id, |room| room.queue_add(track)).await;
        }
        ClientEvent::QueueRemove { room_id, track_id } => {
            let _ = rooms.update(&room_id, |room| room.queue_remove(&track_id)).await;
        }
        ClientEvent::Sync { room_id } => {
            if let Some(snapshot) = rooms.get(&room_id).await {
                reply(tx, &ServerEvent::Sync(snapshot));
            }
        }
    }
}

fn reply(tx: &UnboundedSender<String>, event: &ServerEvent) {
    if let Ok(text) = serde_json::to_string(event) {
        let _ = tx.send(text);
    }
}
