use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use sketchsync_shared::{
    decode_binary, decode_text, encode, ClientMessage, Frame, FrameFormat, ServerMessage,
    MAX_FRAME_BYTES,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::logic::handle_client_message;
use crate::state::AppState;

pub async fn ping_handler() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.max_message_size(MAX_FRAME_BYTES)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

fn into_ws_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text),
        Frame::Binary(bytes) => Message::Binary(bytes),
    }
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = Uuid::new_v4();
    // Replies use the frame kind the peer last sent; JSON until it sends binary.
    let binary = Arc::new(AtomicBool::new(false));

    {
        let mut board = state.board.write().await;
        // Queued before registration so the join sync precedes any broadcast.
        let _ = tx.send(ServerMessage::Sync(board.log.snapshot()));
        board.peers.insert(connection_id, tx);
        info!(
            conn = %connection_id,
            peers = board.peers.len(),
            strokes = board.log.size(),
            "WS connected"
        );
    }

    let send_binary = binary.clone();
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let format = if send_binary.load(Ordering::Relaxed) {
                FrameFormat::Binary
            } else {
                FrameFormat::Json
            };
            let frame = match encode(&message, format) {
                Ok(frame) => frame,
                Err(error) => {
                    warn!(conn = %connection_id, %error, kind = message.kind(), "WS encode failed");
                    continue;
                }
            };
            if socket_sender.send(into_ws_message(frame)).await.is_err() {
                break;
            }
        }
    });

    let mut close_frame = None;

    while let Some(Ok(message)) = socket_receiver.next().await {
        let decoded = match message {
            Message::Text(text) => {
                binary.store(false, Ordering::Relaxed);
                decode_text::<ClientMessage>(&text)
            }
            Message::Binary(data) => {
                binary.store(true, Ordering::Relaxed);
                decode_binary::<ClientMessage>(&data)
            }
            Message::Close(frame) => {
                close_frame = frame;
                break;
            }
            _ => continue,
        };
        match decoded {
            Ok(client_message) => {
                handle_client_message(&state, connection_id, client_message).await
            }
            Err(error) => warn!(conn = %connection_id, %error, "dropping undecodable frame"),
        }
    }

    {
        let mut board = state.board.write().await;
        board.peers.remove(&connection_id);
        info!(
            conn = %connection_id,
            peers = board.peers.len(),
            close = ?close_frame.as_ref().map(|frame| (frame.code, frame.reason.to_string())),
            "WS disconnected"
        );
    }
    send_task.abort();
}
