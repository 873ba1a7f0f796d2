//! Local login endpoint.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Form,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{
    error::AuthError,
    password::{equalize_verification_cost, verify_password},
    session::establish_session,
    state::AuthState,
    storage::{find_by_username, User},
    types::LoginForm,
    utils::normalize_username,
};

/// Verify local credentials against the store.
///
/// Failure is uniform: unknown usernames, federated-only accounts, and wrong
/// passwords all burn the same hashing cost and surface the same
/// `InvalidCredentials`, so none of them is distinguishable from the outside.
async fn authenticate(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user = find_by_username(pool, username).await?;

    let verified = match user
        .as_ref()
        .and_then(|user| user.password_hash.as_deref())
    {
        Some(hash) => verify_password(hash, password),
        None => {
            equalize_verification_cost();
            false
        }
    };

    user.filter(|_| verified).ok_or(AuthError::InvalidCredentials)
}

/// POST /login: verify local credentials and establish a session.
pub async fn login(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Form<LoginForm>>,
) -> impl IntoResponse {
    let Some(Form(form)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let username = normalize_username(&form.username);

    let user = match authenticate(&pool, &username, &form.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            warn!("Login rejected: invalid credentials");
            return Redirect::to("/login").into_response();
        }
        Err(err) => {
            error!("Failed to authenticate user: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response();
        }
    };

    match establish_session(&pool, auth_state.config(), user.id).await {
        Ok(cookie) => {
            info!(user = %user.username, "User logged in");
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            (headers, Redirect::to("/secrets")).into_response()
        }
        Err(err) => {
            error!("Failed to establish session: {err}");
            Redirect::to("/login").into_response()
        }
    }
}
