use super::*;

#[tokio::test]
async fn when_client_connects_then_receives_current_state() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app.clone()).await;

    let mut ws = ws_connect_raw(addr, "abcde", "u2").await;
    let snapshot = ws_expect_state(&mut ws).await;
    assert_eq!(snapshot.code, "ABCDE");
    assert_eq!(snapshot.round, 1);
    assert_eq!(snapshot.turn, 0);
    assert_eq!(snapshot.dm_uid.as_deref(), Some("u1"));
    assert!(snapshot.entries.is_empty());

    assert_eq!(app.hub.client_count(&SessionCode::parse("ABCDE").unwrap()).await, 1);

    server.abort();
}

#[tokio::test]
async fn when_second_client_connects_then_first_client_gets_state_too() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app.clone()).await;

    let mut first_ws = ws_connect(addr, "ABCDE", "u1").await;
    let mut second_ws = ws_connect_raw(addr, "ABCDE", "u2").await;

    let seen_by_second = ws_expect_state(&mut second_ws).await;
    let seen_by_first = ws_expect_state(&mut first_ws).await;
    assert_eq!(seen_by_first, seen_by_second);
    assert_eq!(seen_by_first.code, "ABCDE");

    assert_eq!(app.hub.client_count(&SessionCode::parse("ABCDE").unwrap()).await, 2);

    server.abort();
}

#[tokio::test]
async fn when_session_is_unknown_then_handshake_is_404() {
    let app = build_test_app([]);
    let (addr, server) = spawn_ws_server(app).await;

    assert_eq!(ws_refused_status(addr, "ZZZZZ", Some("u1")).await, 404);
    assert_eq!(ws_refused_status(addr, "not-a-code", Some("u1")).await, 404);

    server.abort();
}

#[tokio::test]
async fn when_identity_is_missing_then_handshake_is_401() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app).await;

    assert_eq!(ws_refused_status(addr, "ABCDE", None).await, 401);

    server.abort();
}

#[tokio::test]
async fn when_client_disconnects_then_hub_forgets_it() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let code = SessionCode::parse("ABCDE").unwrap();
    let (addr, server) = spawn_ws_server(app.clone()).await;

    let mut ws = ws_connect(addr, "ABCDE", "u1").await;
    assert_eq!(app.hub.client_count(&code).await, 1);
    ws.close(None).await.unwrap();

    tokio::time::timeout(RECV_TIMEOUT, async {
        while app.hub.client_count(&code).await > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();

    server.abort();
}
