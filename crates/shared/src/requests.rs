//! HTTP request bodies

use serde::{Deserialize, Serialize};

/// Body of `POST /api/sessions`. A missing or blank code creates a new session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinSessionRequest {
    #[serde(default)]
    pub code: Option<String>,
}
