//! HTTP response bodies

use serde::{Deserialize, Serialize};

use crate::messages::SessionSnapshot;

/// Response of `POST /api/sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionResponse {
    pub code: String,
    /// True when the caller owns the session
    pub is_dm: bool,
}

/// Response of `GET /api/sessions/{code}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub is_dm: bool,
    /// RFC 3339 creation time of the session
    pub created_at: String,
    pub state: SessionSnapshot,
}
