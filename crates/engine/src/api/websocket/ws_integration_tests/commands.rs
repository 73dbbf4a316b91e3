use super::*;

#[tokio::test]
async fn when_dm_runs_goblin_fight_then_hit_points_track_damage() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app).await;

    let mut dm_ws = ws_connect(addr, "ABCDE", "u1").await;
    let mut player_ws = ws_connect(addr, "ABCDE", "u2").await;
    let joined = ws_expect_state(&mut dm_ws).await;
    assert!(joined.entries.is_empty());

    ws_send_client(
        &mut dm_ws,
        &ClientMessage::AddMonster(AddMonsterData {
            name: "Goblin".to_string(),
            hp: 7,
            initiative: 10,
            bonus: 2,
        }),
    )
    .await;
    let snapshot = ws_expect_state(&mut dm_ws).await;
    let goblin = snapshot.entries[0].clone();
    assert_eq!(goblin.kind, EntryKind::Monster);
    assert_eq!((goblin.hp, goblin.max_hp), (Some(7), Some(7)));
    assert!(ws_expect_ack(&mut dm_ws).await.ok);
    let _ = ws_expect_state(&mut player_ws).await;

    // Player cannot hurt it.
    ws_send_client(
        &mut player_ws,
        &ClientMessage::Damage(DamageData {
            id: goblin.id.clone(),
            dmg: 3,
        }),
    )
    .await;
    assert_eq!(
        ws_expect_ack(&mut player_ws).await.error,
        Some(ErrorCode::NotAuthorized)
    );

    for (dmg, expected) in [(3, 4), (10, 0)] {
        ws_send_client(
            &mut dm_ws,
            &ClientMessage::Damage(DamageData {
                id: goblin.id.clone(),
                dmg,
            }),
        )
        .await;
        let snapshot = ws_expect_state(&mut player_ws).await;
        assert_eq!(snapshot.entries[0].hp, Some(expected));
    }

    server.abort();
}

#[tokio::test]
async fn when_damage_names_unknown_id_then_entity_not_found() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app).await;

    let mut dm_ws = ws_connect(addr, "ABCDE", "u1").await;
    ws_send_client(
        &mut dm_ws,
        &ClientMessage::Damage(DamageData {
            id: "goblin".to_string(),
            dmg: 3,
        }),
    )
    .await;

    let ack = ws_expect_ack(&mut dm_ws).await;
    assert_eq!(ack.command, "damage");
    assert_eq!(ack.error, Some(ErrorCode::EntityNotFound));

    server.abort();
}

#[tokio::test]
async fn when_player_rolls_then_initiative_is_d20_plus_bonus() {
    let app = build_test_app([14]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app).await;

    let mut ws = ws_connect(addr, "ABCDE", "u2").await;
    ws_send_client(
        &mut ws,
        &ClientMessage::AddPlayerRoll(AddPlayerRollData {
            name: "Rogue".to_string(),
            bonus: 3,
        }),
    )
    .await;

    let snapshot = ws_expect_state(&mut ws).await;
    assert_eq!(snapshot.entries[0].initiative, 17);
    assert_eq!(snapshot.entries[0].bonus, 3);

    server.abort();
}

#[tokio::test]
async fn when_dm_reorders_then_order_is_broadcast() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app).await;

    let mut dm_ws = ws_connect(addr, "ABCDE", "u1").await;
    let mut snapshot = None;
    for (name, initiative) in [("A", 20), ("B", 10), ("C", 5)] {
        ws_send_client(
            &mut dm_ws,
            &ClientMessage::AddPlayer(AddPlayerData {
                name: name.to_string(),
                initiative,
                bonus: 0,
            }),
        )
        .await;
        snapshot = Some(ws_expect_state(&mut dm_ws).await);
        let _ = ws_expect_ack(&mut dm_ws).await;
    }
    let snapshot = snapshot.unwrap();
    let ids: Vec<String> = snapshot.entries.iter().map(|e| e.id.clone()).collect();

    ws_send_client(
        &mut dm_ws,
        &ClientMessage::Reorder(ReorderData {
            order: vec![ids[2].clone(), "bogus".to_string(), ids[0].clone()],
        }),
    )
    .await;

    let reordered = ws_expect_state(&mut dm_ws).await;
    let names: Vec<&str> = reordered.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["C", "A", "B"]);

    server.abort();
}

#[tokio::test]
async fn when_everyone_acts_then_round_advances() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app).await;

    let mut ws = ws_connect(addr, "ABCDE", "u2").await;
    for name in ["A", "B"] {
        ws_send_client(
            &mut ws,
            &ClientMessage::AddPlayer(AddPlayerData {
                name: name.to_string(),
                initiative: 10,
                bonus: 0,
            }),
        )
        .await;
        let _ = ws_expect_ack(&mut ws).await;
    }

    ws_send_client(&mut ws, &ClientMessage::Next).await;
    let first = ws_expect_state(&mut ws).await;
    assert_eq!((first.turn, first.round), (1, 1));

    ws_send_client(&mut ws, &ClientMessage::Next).await;
    let second = ws_expect_state(&mut ws).await;
    assert_eq!((second.turn, second.round), (0, 2));

    server.abort();
}

#[tokio::test]
async fn when_message_is_unrecognized_then_it_is_ignored() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app).await;

    let mut ws = ws_connect(addr, "ABCDE", "u1").await;
    ws_send_raw(&mut ws, r#"{"type":"reset"}"#).await;
    ws_send_raw(&mut ws, "not json at all").await;
    ws_send_raw(&mut ws, r#"{"type":"addPlayer","data":[1,2]}"#).await;
    ws_send_client(&mut ws, &ClientMessage::Next).await;

    // The first reply belongs to `next`; the connection survived the junk.
    let ack = ws_expect_ack(&mut ws).await;
    assert_eq!(ack.command, "next");
    assert!(ack.ok);

    server.abort();
}

#[tokio::test]
async fn when_numbers_are_malformed_then_they_read_as_zero() {
    let app = build_test_app([]);
    open_session(&app, "ABCDE", "u1").await;
    let (addr, server) = spawn_ws_server(app).await;

    let mut ws = ws_connect(addr, "ABCDE", "u1").await;
    ws_send_raw(
        &mut ws,
        r#"{"type":"addPlayer","data":{"name":"Aria","initiative":"12","bonus":2.9}}"#,
    )
    .await;

    let snapshot = ws_expect_state(&mut ws).await;
    assert_eq!(snapshot.entries[0].initiative, 0);
    assert_eq!(snapshot.entries[0].bonus, 2);

    server.abort();
}
