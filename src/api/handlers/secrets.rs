//! Public secrets board and secret submission.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect},
    Form,
};
use sqlx::PgPool;
use tracing::{error, info};

use super::auth::{
    error::AuthError,
    session::require_auth,
    storage::{list_with_secret, update_secret},
    types::SubmitForm,
};
use super::{escape_html, pages::page};

/// GET /secrets: the shared board. Public; every non-empty secret is listed.
pub async fn board(pool: Extension<PgPool>) -> impl IntoResponse {
    let entries = match list_with_secret(&pool).await {
        Ok(entries) => entries,
        Err(err) => {
            error!("Failed to list secrets: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load secrets".to_string(),
            )
                .into_response();
        }
    };

    let mut body = String::from("<h1>You've discovered my secret!</h1>\n<ul>\n");
    for secret in &entries {
        body.push_str("  <li>");
        body.push_str(&escape_html(secret));
        body.push_str("</li>\n");
    }
    body.push_str("</ul>\n<p><a href=\"/submit\">Submit a secret</a> | <a href=\"/logout\">Logout</a></p>");

    Html(page("Secrets", &body)).into_response()
}

/// POST /submit: overwrite the caller's secret.
///
/// A submission against a vanished user is a visible error, not a silent
/// drop: the diagnostic is logged and the client gets a 500.
pub async fn submit(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Form<SubmitForm>>,
) -> impl IntoResponse {
    let principal = match require_auth(&headers, &pool).await {
        Ok(principal) => principal,
        Err(status) => {
            return if status == StatusCode::UNAUTHORIZED {
                Redirect::to("/login").into_response()
            } else {
                status.into_response()
            };
        }
    };

    let Some(Form(form)) = payload else {
        return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response();
    };

    match update_secret(&pool, principal.user_id, &form.secret).await {
        Ok(()) => {
            info!(user = %principal.username, "Secret updated");
            Redirect::to("/secrets").into_response()
        }
        Err(AuthError::NotFound) => {
            error!("Secret submission for missing user {}", principal.user_id);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Account no longer exists".to_string(),
            )
                .into_response()
        }
        Err(err) => {
            error!("Failed to update secret: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save secret".to_string(),
            )
                .into_response()
        }
    }
}
