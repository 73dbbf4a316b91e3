use super::*;

use initrack_shared::ServerMessage;

use std::{net::SocketAddr, time::Duration};

use chrono::Utc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{client::IntoClientRequest, Error as WsError, Message as WsMessage},
    MaybeTlsStream, WebSocketStream,
};

use crate::infrastructure::clock::{FixedClock, ScriptedRandom};
use crate::infrastructure::config::AppConfig;

pub(crate) type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub(crate) const RECV_TIMEOUT: Duration = Duration::from_secs(2);
pub(crate) const QUIET_TIMEOUT: Duration = Duration::from_millis(300);

/// App with a frozen clock and scripted d20 rolls.
pub(crate) fn build_test_app(rolls: impl IntoIterator<Item = i32>) -> Arc<App> {
    Arc::new(App::with_ports(
        AppConfig::default(),
        Arc::new(FixedClock(Utc::now())),
        Arc::new(ScriptedRandom::new(rolls)),
    ))
}

/// Create `code` with `owner` as its DM.
pub(crate) async fn open_session(app: &App, code: &str, owner: &str) {
    app.sessions
        .create_or_get(Some(code), &UserId::new(owner).unwrap())
        .await
        .unwrap();
}

pub(crate) async fn spawn_ws_server(app: Arc<App>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = crate::api::router(app);

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, handle)
}

async fn ws_try_connect(
    addr: SocketAddr,
    code: &str,
    user: Option<&str>,
) -> Result<WsClient, WsError> {
    let mut request = format!("ws://{addr}/ws/{code}")
        .into_client_request()
        .unwrap();
    if let Some(user) = user {
        request
            .headers_mut()
            .insert("x-user-id", user.parse().unwrap());
    }
    connect_async(request).await.map(|(ws, _resp)| ws)
}

/// Connect as `user` and swallow the initial state push.
pub(crate) async fn ws_connect(addr: SocketAddr, code: &str, user: &str) -> WsClient {
    let mut ws = ws_try_connect(addr, code, Some(user)).await.unwrap();
    let _ = ws_expect_message(&mut ws, RECV_TIMEOUT, |m| matches!(m, ServerMessage::State(_))).await;
    ws
}

/// Connect without swallowing anything.
pub(crate) async fn ws_connect_raw(addr: SocketAddr, code: &str, user: &str) -> WsClient {
    ws_try_connect(addr, code, Some(user)).await.unwrap()
}

/// HTTP status of a refused handshake.
pub(crate) async fn ws_refused_status(addr: SocketAddr, code: &str, user: Option<&str>) -> u16 {
    match ws_try_connect(addr, code, user).await {
        Err(WsError::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("unexpected handshake error: {e}"),
        Ok(_) => panic!("handshake unexpectedly succeeded"),
    }
}

pub(crate) async fn ws_send_client(ws: &mut WsClient, msg: &ClientMessage) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(WsMessage::Text(json)).await.unwrap();
}

pub(crate) async fn ws_send_raw(ws: &mut WsClient, text: &str) {
    ws.send(WsMessage::Text(text.to_string())).await.unwrap();
}

pub(crate) async fn ws_recv_server(ws: &mut WsClient) -> ServerMessage {
    loop {
        let msg = ws.next().await.unwrap().unwrap();
        match msg {
            WsMessage::Text(text) => {
                return serde_json::from_str::<ServerMessage>(&text).unwrap();
            }
            WsMessage::Binary(bin) => {
                let text = String::from_utf8(bin).unwrap();
                return serde_json::from_str::<ServerMessage>(&text).unwrap();
            }
            _ => {}
        }
    }
}

pub(crate) async fn ws_expect_message<F>(
    ws: &mut WsClient,
    timeout: Duration,
    mut predicate: F,
) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws).await;
            if predicate(&msg) {
                return msg;
            }
        }
    })
    .await
    .unwrap()
}

pub(crate) async fn ws_expect_no_message_matching<F>(
    ws: &mut WsClient,
    timeout: Duration,
    mut predicate: F,
) where
    F: FnMut(&ServerMessage) -> bool,
{
    let result = tokio::time::timeout(timeout, async {
        loop {
            let msg = ws_recv_server(ws).await;
            if predicate(&msg) {
                panic!("unexpected message: {:?}", msg);
            }
        }
    })
    .await;

    // We only succeed if we timed out without seeing a matching message.
    assert!(result.is_err());
}

/// Next state push, as a snapshot.
pub(crate) async fn ws_expect_state(ws: &mut WsClient) -> initrack_shared::SessionSnapshot {
    match ws_expect_message(ws, RECV_TIMEOUT, |m| matches!(m, ServerMessage::State(_))).await {
        ServerMessage::State(snapshot) => snapshot,
        other => panic!("expected state, got {other:?}"),
    }
}

/// Next ack.
pub(crate) async fn ws_expect_ack(ws: &mut WsClient) -> initrack_shared::CommandAck {
    match ws_expect_message(ws, RECV_TIMEOUT, |m| matches!(m, ServerMessage::Ack(_))).await {
        ServerMessage::Ack(ack) => ack,
        other => panic!("expected ack, got {other:?}"),
    }
}
