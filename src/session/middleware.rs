//! Session cookie middleware
//!
//! Resolves the signed session cookie to a [`SessionId`] before every handler
//! runs. A cookie is only issued once a handler has stored something in a
//! fresh session.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use uuid::Uuid;

use super::types::SessionId;
use crate::state::AppState;

pub async fn session_layer(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_name = state.config().session.cookie_name.clone();

    // Tampered or unsigned cookies are dropped by the jar and never reach here
    let candidate = jar
        .get(&cookie_name)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        .map(SessionId);

    let (session_id, fresh) = state.sessions().resolve(candidate).await;
    if fresh {
        state.sessions().cleanup_expired(state.artifacts()).await;
    }

    request.extensions_mut().insert(session_id);
    let response = next.run(request).await;

    if !fresh || !state.sessions().contains(session_id).await {
        return response;
    }

    let cookie = Cookie::build((cookie_name, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (jar.add(cookie), response).into_response()
}
