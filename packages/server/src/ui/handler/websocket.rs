//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{domain::SessionId, ui::state::AppState, usecase::ProtocolError};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the session's outbound channel into the WebSocket sink.
///
/// When the channel is closed (the session was unregistered from the MessagePusher,
/// e.g. evicted by the health monitor) a Close frame is sent and the task ends.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(msg.into())).await {
                tracing::debug!("Failed to write to socket: {}", e);
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this session to receive outbound frames
    let (tx, rx) = mpsc::unbounded_channel();
    let session_id = SessionId::generate();
    state
        .connect_session_usecase
        .execute(session_id, tx)
        .await;
    tracing::info!("Session '{}' connected", session_id);

    let state_clone = state.clone();

    // Spawn a task to receive frames from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on session '{}': {}", session_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Session '{}' received: {}", session_id, text.as_str());
                    match state_clone
                        .handle_message_usecase
                        .execute(&session_id, text.as_str())
                        .await
                    {
                        Ok(()) => {}
                        Err(ProtocolError::SessionNotFound(_)) => {
                            // 強制切断済み
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("Dropped frame from session '{}': {}", session_id, e);
                        }
                    }
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from session '{}'", session_id);
                }
                Message::Close(_) => {
                    tracing::info!("Session '{}' requested close", session_id);
                    break;
                }
                // Ping/pong is handled automatically by the WebSocket protocol
                _ => {}
            }
        }
    });

    // Spawn a task to push outbound frames to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state
        .disconnect_session_usecase
        .execute(&session_id)
        .await;
    tracing::info!("Session '{}' disconnected", session_id);
}
