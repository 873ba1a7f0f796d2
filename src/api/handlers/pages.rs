//! Minimal server-rendered pages.
//!
//! The page surface is deliberately thin: inline HTML, no templating engine,
//! no assets. The interesting behavior lives in the auth and board handlers.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect},
};
use sqlx::PgPool;

use super::auth::session::require_auth;

pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

pub async fn home() -> impl IntoResponse {
    Html(page(
        "Segreti",
        r#"<h1>Segreti</h1>
<p>Share a secret, anonymously.</p>
<p><a href="/register">Register</a> | <a href="/login">Login</a> | <a href="/secrets">Secrets</a></p>"#,
    ))
}

pub async fn register_form() -> impl IntoResponse {
    Html(page(
        "Register",
        r#"<h1>Register</h1>
<form action="/register" method="post">
  <label>Email <input type="email" name="username" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Register</button>
</form>
<p><a href="/auth/google">Sign up with Google</a></p>"#,
    ))
}

pub async fn login_form() -> impl IntoResponse {
    Html(page(
        "Login",
        r#"<h1>Login</h1>
<form action="/login" method="post">
  <label>Email <input type="email" name="username" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Login</button>
</form>
<p><a href="/auth/google">Sign in with Google</a></p>"#,
    ))
}

/// GET /submit: the submission form, for authenticated users only.
pub async fn submit_form(headers: HeaderMap, pool: Extension<PgPool>) -> impl IntoResponse {
    match require_auth(&headers, &pool).await {
        Ok(_) => Html(page(
            "Submit a Secret",
            r#"<h1>Submit a Secret</h1>
<form action="/submit" method="post">
  <label>Secret <input type="text" name="secret" required></label>
  <button type="submit">Submit</button>
</form>"#,
        ))
        .into_response(),
        Err(status) => {
            if status == StatusCode::UNAUTHORIZED {
                Redirect::to("/login").into_response()
            } else {
                status.into_response()
            }
        }
    }
}
