//! Session endpoints and cookie helpers.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Redirect},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::{
    error::AuthError,
    state::{AuthConfig, AuthState},
    storage::{delete_session, insert_session, lookup_session, SessionRecord},
    types::SessionResponse,
    utils::{extract_cookie, hash_session_token},
};

const SESSION_COOKIE_NAME: &str = "segreti_session";

/// Authenticated user context derived from the session cookie.
#[derive(Clone, Debug)]
pub(crate) struct Principal {
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
}

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 204, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn session(headers: HeaderMap, pool: Extension<PgPool>) -> impl IntoResponse {
    match authenticate_session(&headers, &pool).await {
        Ok(Some(SessionRecord { user_id, username })) => {
            let response = SessionResponse {
                user_id: user_id.to_string(),
                username,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(status) => status.into_response(),
    }
}

/// GET /logout: terminate the session and return to the landing page.
pub async fn logout(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    match terminate_session(&headers, &pool, auth_state.config()).await {
        Ok(response_headers) => (response_headers, Redirect::to("/")).into_response(),
        Err(err) => {
            error!("Failed to terminate session: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to log out".to_string(),
            )
                .into_response()
        }
    }
}

/// Resolve a session cookie into a session record, if present.
///
/// Returns `Ok(None)` when the cookie is missing, expired, or the user no
/// longer resolves; an invalid session is not an error.
pub(crate) async fn authenticate_session(
    headers: &HeaderMap,
    pool: &PgPool,
) -> Result<Option<SessionRecord>, StatusCode> {
    // Missing cookies are treated as "no session" to avoid leaking auth state.
    let Some(token) = extract_cookie(headers, SESSION_COOKIE_NAME) else {
        return Ok(None);
    };
    // Only the hash is stored; never compare raw tokens against the database.
    let token_hash = hash_session_token(&token);
    match lookup_session(pool, &token_hash).await {
        Ok(record) => Ok(record),
        Err(err) => {
            error!("Failed to lookup session: {err}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Resolve a session cookie into a principal, or return 401 for missing sessions.
pub(crate) async fn require_auth(
    headers: &HeaderMap,
    pool: &PgPool,
) -> Result<Principal, StatusCode> {
    match authenticate_session(headers, pool).await {
        Ok(Some(record)) => Ok(Principal {
            user_id: record.user_id,
            username: record.username,
        }),
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(status) => Err(status),
    }
}

/// Bind a user to a fresh session and return the cookie to set.
///
/// Callers must attach the cookie to the response that carries the redirect,
/// so the session is always established before the client follows it.
pub(crate) async fn establish_session(
    pool: &PgPool,
    config: &AuthConfig,
    user_id: Uuid,
) -> Result<HeaderValue, AuthError> {
    let token = insert_session(pool, user_id, config.session_ttl_seconds())
        .await
        .map_err(AuthError::LoginError)?;
    session_cookie(config, &token).map_err(|err| AuthError::LoginError(anyhow::Error::new(err)))
}

/// Delete the session row (if any) and clear the cookie; idempotent.
pub(crate) async fn terminate_session(
    headers: &HeaderMap,
    pool: &PgPool,
    config: &AuthConfig,
) -> Result<HeaderMap, anyhow::Error> {
    if let Some(token) = extract_cookie(headers, SESSION_COOKIE_NAME) {
        let token_hash = hash_session_token(&token);
        delete_session(pool, &token_hash).await?;
    }

    // Always clear the cookie, even if the session record was missing.
    let mut response_headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(config) {
        response_headers.insert(SET_COOKIE, cookie);
    }
    Ok(response_headers)
}

/// Build a secure `HttpOnly` cookie for the session token.
pub(crate) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    // Only mark cookies secure when the service is served over HTTPS.
    let secure = config.session_cookie_secure();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = config.session_cookie_secure();
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config(base_url: &str) -> AuthConfig {
        AuthConfig::new(
            base_url.to_string(),
            "client-id".to_string(),
            SecretString::from("client-secret".to_string()),
            format!("{base_url}/auth/google/secrets"),
        )
        .with_session_ttl_seconds(3600)
    }

    #[test]
    fn session_cookie_has_expected_attributes() {
        let cookie = session_cookie(&config("http://localhost:3000"), "token123")
            .ok()
            .and_then(|value| value.to_str().map(str::to_string).ok());
        assert_eq!(
            cookie.as_deref(),
            Some("segreti_session=token123; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600")
        );
    }

    #[test]
    fn session_cookie_secure_only_over_https() -> Result<(), InvalidHeaderValue> {
        let cookie = session_cookie(&config("https://segreti.dev"), "token123")?;
        assert!(cookie.to_str().is_ok_and(|c| c.ends_with("; Secure")));

        let cookie = session_cookie(&config("http://localhost:3000"), "token123")?;
        assert!(cookie.to_str().is_ok_and(|c| !c.contains("Secure")));
        Ok(())
    }

    #[test]
    fn clear_session_cookie_expires_immediately() -> Result<(), InvalidHeaderValue> {
        let cookie = clear_session_cookie(&config("https://segreti.dev"))?;
        assert!(cookie
            .to_str()
            .is_ok_and(|c| c.starts_with("segreti_session=;") && c.contains("Max-Age=0")));
        Ok(())
    }
}
