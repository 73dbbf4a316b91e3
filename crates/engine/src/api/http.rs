//! HTTP routes.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use initrack_domain::{DomainError, SessionCode};
use initrack_shared::{JoinSessionRequest, JoinSessionResponse, SessionView};

use super::identity::{mint_identity, set_identity_cookie, RequestIdentity};
use crate::app::App;
use crate::stores::SessionError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/sessions", post(join_session))
        .route("/api/sessions/{code}", get(get_session))
}

async fn health() -> &'static str {
    "OK"
}

/// Join a session, creating it when the code is new or absent.
///
/// A caller without identity gets one minted and handed back as a cookie.
async fn join_session(
    State(app): State<Arc<App>>,
    RequestIdentity(identity): RequestIdentity,
    Json(request): Json<JoinSessionRequest>,
) -> Result<Response, ApiError> {
    let (user, minted) = match identity {
        Some(user) => (user, false),
        None => (
            mint_identity().ok_or_else(|| ApiError::Internal("identity minting failed".into()))?,
            true,
        ),
    };

    let snapshot = app
        .sessions
        .create_or_get(request.code.as_deref(), &user)
        .await?;

    let is_dm = snapshot.dm_uid.as_deref() == Some(user.as_str());
    let mut response = Json(JoinSessionResponse {
        code: snapshot.code,
        is_dm,
    })
    .into_response();
    if minted {
        set_identity_cookie(response.headers_mut(), &user);
    }
    Ok(response)
}

async fn get_session(
    State(app): State<Arc<App>>,
    RequestIdentity(identity): RequestIdentity,
    Path(code): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let code = SessionCode::parse(&code).map_err(|_| ApiError::NotFound)?;
    let state = app.sessions.get(&code).await?;
    let created_at = app.sessions.created_at(&code).await?.to_rfc3339();
    let is_dm = match (&identity, state.dm_uid.as_deref()) {
        (Some(user), Some(owner)) => user.as_str() == owner,
        _ => false,
    };
    Ok(Json(SessionView {
        is_dm,
        created_at,
        state,
    }))
}

#[derive(Debug)]
pub enum ApiError {
    NotFound,
    BadRequest(String),
    Unavailable(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "session not found").into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg).into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => ApiError::NotFound,
            SessionError::CodeSpaceExhausted { .. } => ApiError::Unavailable(e.to_string()),
            SessionError::Domain(DomainError::InvalidSessionCode(_))
            | SessionError::Domain(DomainError::Validation(_)) => ApiError::BadRequest(e.to_string()),
            SessionError::Domain(other) => ApiError::Internal(other.to_string()),
        }
    }
}
