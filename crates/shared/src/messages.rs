//! WebSocket message types for engine-client communication
//!
//! Every frame is a JSON object `{ "type": ..., "data": ... }` in both
//! directions.
//!
//! ## Compatibility Policy
//!
//! - Inbound frames with an unknown `type` or an undecodable `data` are
//!   dropped by [`ClientMessage::decode`]; the connection stays open
//! - Numeric payload fields are lenient (see the field docs)
//! - New variants can be added at the end (forward compatible)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lenient;

// =============================================================================
// Client Messages (browser → engine)
// =============================================================================

/// Commands sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Add a player character with a known initiative
    AddPlayer(AddPlayerData),
    /// Add a player character, rolling d20 + bonus for initiative
    AddPlayerRoll(AddPlayerRollData),
    /// DM adds a creature
    AddMonster(AddMonsterData),
    /// DM changes a creature's hit points
    Damage(DamageData),
    /// DM rearranges the turn order
    Reorder(ReorderData),
    /// Advance to the next turn
    Next,
}

/// Payload of `addPlayer`. Numbers are lenient: non-numbers read as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPlayerData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub initiative: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub bonus: i32,
}

/// Payload of `addPlayerRoll`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPlayerRollData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub bonus: i32,
}

/// Payload of `addMonster`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMonsterData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub hp: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub initiative: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub bonus: i32,
}

/// Payload of `damage`. A negative `dmg` heals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub dmg: i32,
}

/// Payload of `reorder`; non-string entries are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderData {
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub order: Vec<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl ClientMessage {
    /// Decode one text frame.
    ///
    /// Returns `None` for anything that is not a known command with a usable
    /// payload; callers drop such frames without replying.
    pub fn decode(text: &str) -> Option<Self> {
        let Envelope { kind, data } = serde_json::from_str(text).ok()?;
        if kind == "next" {
            return Some(Self::Next);
        }

        let data = match data {
            Value::Null => Value::Object(Default::default()),
            Value::Object(map) => Value::Object(map),
            _ => return None,
        };

        match kind.as_str() {
            "addPlayer" => serde_json::from_value(data).ok().map(Self::AddPlayer),
            "addPlayerRoll" => serde_json::from_value(data).ok().map(Self::AddPlayerRoll),
            "addMonster" => serde_json::from_value(data).ok().map(Self::AddMonster),
            "damage" => serde_json::from_value(data).ok().map(Self::Damage),
            "reorder" => serde_json::from_value(data).ok().map(Self::Reorder),
            _ => None,
        }
    }

    /// The wire `type` of this command, echoed back in acks.
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::AddPlayer(_) => "addPlayer",
            Self::AddPlayerRoll(_) => "addPlayerRoll",
            Self::AddMonster(_) => "addMonster",
            Self::Damage(_) => "damage",
            Self::Reorder(_) => "reorder",
            Self::Next => "next",
        }
    }
}

// =============================================================================
// Server Messages (engine → browser)
// =============================================================================

/// Messages from the engine to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Full session state, pushed on connect and after every applied command
    State(SessionSnapshot),
    /// Result of one command, sent only to the client that issued it
    Ack(CommandAck),
}

/// Full session snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub code: String,
    pub round: u32,
    /// Index into `entries` of the participant whose turn it is
    pub turn: usize,
    /// Mutation counter; a client may ignore snapshots older than one it has shown
    pub version: u64,
    /// Identity of the DM, if claimed
    pub dm_uid: Option<String>,
    /// Participants in turn order
    pub entries: Vec<ParticipantEntry>,
}

/// One participant as rendered by clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub initiative: i32,
    pub bonus: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_uid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Player,
    Monster,
}

/// Per-command acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    /// Wire `type` of the acknowledged command
    pub command: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
}

impl CommandAck {
    pub fn ok(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ok: true,
            error: None,
        }
    }

    pub fn rejected(command: &str, error: ErrorCode) -> Self {
        Self {
            command: command.to_string(),
            ok: false,
            error: Some(error),
        }
    }

    /// Refusal for a failure with no client-facing kind.
    pub fn failed(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ok: false,
            error: None,
        }
    }
}

/// Error kinds reported to the client that sent a rejected command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    SessionNotFound,
    NotAuthorized,
    EntityNotFound,
}
