//! Tracker command dispatch.
//!
//! Every decoded command is answered with an ack to its sender. Applied
//! commands also push the new state to every client of the session.

use initrack_domain::{ConnectionId, ParticipantId, SessionCode, UserId};
use initrack_shared::{ClientMessage, CommandAck, ServerMessage, SessionSnapshot};

use crate::app::App;
use crate::stores::SessionError;

pub(super) async fn handle_command(
    msg: ClientMessage,
    app: &App,
    code: &SessionCode,
    connection_id: ConnectionId,
    user_id: &UserId,
) {
    let command = msg.command_name();

    let ack = match apply(msg, app, code, user_id).await {
        Ok(snapshot) => {
            let delivered = app.hub.broadcast_state(code, snapshot).await;
            tracing::debug!(session_code = %code, command, delivered, "State broadcast");
            CommandAck::ok(command)
        }
        Err(e) => {
            tracing::warn!(
                session_code = %code,
                user_id = %user_id,
                command,
                error = %e,
                "Command rejected"
            );
            match e.error_code() {
                Some(kind) => CommandAck::rejected(command, kind),
                None => CommandAck::failed(command),
            }
        }
    };

    app.hub
        .send_to(code, connection_id, ServerMessage::Ack(ack))
        .await;
}

async fn apply(
    msg: ClientMessage,
    app: &App,
    code: &SessionCode,
    user_id: &UserId,
) -> Result<SessionSnapshot, SessionError> {
    let sessions = &app.sessions;
    match msg {
        ClientMessage::AddPlayer(data) => {
            let applied = sessions
                .add_player(code, user_id, &data.name, data.initiative, data.bonus)
                .await?;
            tracing::info!(
                session_code = %code,
                participant_id = %applied.value.id(),
                initiative = applied.value.initiative(),
                "Player added"
            );
            Ok(applied.snapshot)
        }

        ClientMessage::AddPlayerRoll(data) => {
            let applied = sessions
                .add_player_with_roll(code, user_id, &data.name, data.bonus)
                .await?;
            tracing::info!(
                session_code = %code,
                participant_id = %applied.value.id(),
                initiative = applied.value.initiative(),
                "Player added with rolled initiative"
            );
            Ok(applied.snapshot)
        }

        ClientMessage::AddMonster(data) => {
            let applied = sessions
                .add_monster(code, user_id, &data.name, data.hp, data.bonus, data.initiative)
                .await?;
            tracing::info!(
                session_code = %code,
                participant_id = %applied.value.id(),
                initiative = applied.value.initiative(),
                "Creature added"
            );
            Ok(applied.snapshot)
        }

        ClientMessage::Damage(data) => {
            // A fresh id matches nothing, so ownership is still checked first.
            let participant_id = ParticipantId::parse(&data.id).unwrap_or_default();
            let applied = sessions
                .damage_monster(code, user_id, participant_id, data.dmg)
                .await?;
            tracing::info!(
                session_code = %code,
                participant_id = %participant_id,
                outcome = ?applied.value,
                "Creature hit points changed"
            );
            Ok(applied.snapshot)
        }

        ClientMessage::Reorder(data) => {
            // Unparseable ids cannot name a participant; drop them like unknown ones.
            let ordered: Vec<ParticipantId> = data
                .order
                .iter()
                .filter_map(|raw| ParticipantId::parse(raw))
                .collect();
            let applied = sessions.reorder(code, user_id, &ordered).await?;
            tracing::info!(session_code = %code, "Turn order rearranged");
            Ok(applied.snapshot)
        }

        ClientMessage::Next => {
            let applied = sessions.next_turn(code).await?;
            if applied.value.new_round {
                tracing::info!(session_code = %code, round = applied.value.round, "New round");
            }
            Ok(applied.snapshot)
        }
    }
}
