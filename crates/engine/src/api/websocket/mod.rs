//! WebSocket handling for tracker clients.
//!
//! One connection is bound to one session for its whole life. The session
//! and the caller's identity are resolved before the upgrade, so a socket
//! only opens for a known session and an identified user.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::oneshot;

use initrack_domain::{ConnectionId, SessionCode, UserId};
use initrack_shared::ClientMessage;

use super::identity::RequestIdentity;
use crate::app::App;

mod ws_tracker;

#[cfg(test)]
mod test_support;


/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(
    State(app): State<Arc<App>>,
    Path(code): Path<String>,
    RequestIdentity(identity): RequestIdentity,
    ws: WebSocketUpgrade,
) -> Response {
    let code = match SessionCode::parse(&code) {
        Ok(code) if app.sessions.contains(&code) => code,
        _ => return (StatusCode::NOT_FOUND, "session not found").into_response(),
    };

    let Some(user_id) = identity else {
        return (StatusCode::UNAUTHORIZED, "missing identity").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, app, code, user_id))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, app: Arc<App>, code: SessionCode, user_id: UserId) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = ConnectionId::new();
    let mut rx = app
        .hub
        .add_client(code.clone(), connection_id, user_id.clone())
        .await;

    tracing::info!(
        session_code = %code,
        connection_id = %connection_id,
        user_id = %user_id,
        "WebSocket connection established"
    );

    // Everyone already in the session sees the newcomer's arrival too.
    match app.sessions.get(&code).await {
        Ok(snapshot) => {
            let delivered = app.hub.broadcast_state(&code, snapshot).await;
            tracing::debug!(session_code = %code, delivered, "Initial state broadcast");
        }
        Err(e) => {
            tracing::warn!(session_code = %code, error = %e, "No initial snapshot");
        }
    }

    // Forward queued messages to the socket. The queue closes when the hub
    // evicts this client, which ends the task.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize server message");
                }
            }
        }
        let _ = ws_sender.send(Message::Close(None)).await;
    });

    // The reader is told to stop rather than aborted, so a command it has
    // already started is applied, broadcast and acked before it exits.
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let recv_app = app.clone();
    let recv_code = code.clone();
    let mut recv_task = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                biased;
                _ = &mut stop_rx => break,
                frame = ws_receiver.next() => frame,
            };
            let Some(result) = frame else {
                break;
            };
            match result {
                Ok(Message::Text(text)) => match ClientMessage::decode(text.as_str()) {
                    Some(msg) => {
                        ws_tracker::handle_command(
                            msg,
                            &recv_app,
                            &recv_code,
                            connection_id,
                            &user_id,
                        )
                        .await;
                    }
                    None => {
                        tracing::debug!(
                            connection_id = %connection_id,
                            "Ignoring unrecognized message"
                        );
                    }
                },
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            let _ = stop_tx.send(());
            if let Err(e) = (&mut recv_task).await {
                tracing::warn!(connection_id = %connection_id, error = %e, "Reader task failed");
            }
        }
        _ = &mut recv_task => send_task.abort(),
    }

    // Clean up
    app.hub.remove_client(&code, connection_id).await;

    tracing::info!(
        session_code = %code,
        connection_id = %connection_id,
        "WebSocket connection terminated"
    );
}
