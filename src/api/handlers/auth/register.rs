//! Local registration endpoint.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Form,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::handlers::{valid_email, valid_password};

use super::{
    error::AuthError,
    password::hash_password,
    session::establish_session,
    state::AuthState,
    storage::create_local_user,
    types::RegisterForm,
    utils::normalize_username,
};

/// POST /register: create a local-credential user and sign them in.
///
/// Invalid input and duplicate usernames redirect back to the registration
/// form; only store failures surface as 500s.
pub async fn register(
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Form<RegisterForm>>,
) -> impl IntoResponse {
    let Some(Form(form)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    let username = normalize_username(&form.username);

    if !valid_email(&username) || !valid_password(&form.password) {
        return Redirect::to("/register").into_response();
    }

    let password_hash = match hash_password(&form.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    };

    let user = match create_local_user(&pool, &username, &password_hash).await {
        Ok(user) => user,
        Err(AuthError::DuplicateUsername) => {
            warn!("Registration rejected: username already exists");
            return Redirect::to("/register").into_response();
        }
        Err(err) => {
            error!("Failed to create user: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    };

    // The cookie must ride on the redirect response itself, so the session
    // exists before the client follows it.
    match establish_session(&pool, auth_state.config(), user.id).await {
        Ok(cookie) => {
            info!(user = %user.username, "User registered");
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
