//! Google federated login (OAuth 2.0 authorization code flow).
//!
//! Flow per attempt: redirect to the consent screen, receive the callback,
//! exchange the code for tokens, resolve the profile, then find-or-create
//! the local user keyed on the provider's stable `sub` identifier. Any
//! provider error fails the attempt; nothing is retried.

use anyhow::{anyhow, Context, Result};
use axum::{
    extract::{Extension, Query},
    http::{
        header::{InvalidHeaderValue, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Redirect},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use super::{
    session::establish_session,
    state::{AuthConfig, AuthState},
    storage::find_or_create_google_user,
    types::GoogleCallbackQuery,
    utils::{extract_cookie, generate_state_token},
};

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const STATE_COOKIE_NAME: &str = "segreti_oauth_state";
const STATE_COOKIE_MAX_AGE_SECONDS: i64 = 600;
const SCOPES: &str = "profile email";

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize, Debug)]
struct UserInfo {
    sub: String,
    email: Option<String>,
}

/// GET /auth/google: redirect to the provider consent screen.
///
/// No server-side state is created; the CSRF nonce rides in a short-lived
/// cookie and is checked against the `state` query on callback.
pub async fn begin(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    let state = match generate_state_token() {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to generate state token: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let url = match authorization_url(auth_state.config(), &state) {
        Ok(url) => url,
        Err(err) => {
            error!("Failed to build authorization URL: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut headers = HeaderMap::new();
    match state_cookie(auth_state.config(), &state) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build state cookie: {err}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    (headers, Redirect::to(&url)).into_response()
}

/// GET /auth/google/secrets: provider callback.
///
/// Every failure path clears the state cookie and redirects to the local
/// login page; success establishes a session and lands on the board.
pub async fn callback(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    Query(query): Query<GoogleCallbackQuery>,
) -> impl IntoResponse {
    let config = auth_state.config();

    let user = match resolve_callback(&headers, &pool, &auth_state, &query).await {
        Ok(user) => user,
        Err(err) => {
            warn!("Federated login failed: {err}");
            return failure_response(config);
        }
    };

    match establish_session(&pool, config, user.id).await {
        Ok(cookie) => {
            info!(user = %user.username, "Federated user logged in");
            let mut response_headers = HeaderMap::new();
            if let Ok(clear) = clear_state_cookie(config) {
                response_headers.append(SET_COOKIE, clear);
            }
            response_headers.append(SET_COOKIE, cookie);
            (response_headers, Redirect::to("/secrets")).into_response()
        }
        Err(err) => {
            error!("Failed to establish session: {err}");
            failure_response(config)
        }
    }
}

async fn resolve_callback(
    headers: &HeaderMap,
    pool: &PgPool,
    auth_state: &AuthState,
    query: &GoogleCallbackQuery,
) -> Result<super::storage::User> {
    if let Some(provider_error) = query.error.as_deref() {
        return Err(anyhow!("provider returned error: {provider_error}"));
    }

    // The nonce set before the redirect must match the one Google echoes back.
    let expected_state =
        extract_cookie(headers, STATE_COOKIE_NAME).context("missing state cookie")?;
    let state = query.state.as_deref().context("missing state parameter")?;
    if state != expected_state {
        return Err(anyhow!("state mismatch"));
    }

    let code = query.code.as_deref().context("missing authorization code")?;

    let token = exchange_code(auth_state.http(), auth_state.config(), code).await?;
    let profile = fetch_userinfo(auth_state.http(), &token.access_token).await?;
    let email = profile.email.context("profile has no email")?;

    let user = find_or_create_google_user(pool, &profile.sub, &email)
        .await
        .map_err(|err| anyhow!(err))?;

    debug!(google_id = ?user.google_id, "federated identity resolved");

    Ok(user)
}

/// Build the provider authorization URL for the requested scopes.
fn authorization_url(config: &AuthConfig, state: &str) -> Result<String> {
    let mut url = Url::parse(AUTHORIZATION_ENDPOINT).context("invalid authorization endpoint")?;
    url.query_pairs_mut()
        .append_pair("client_id", config.google_client_id())
        .append_pair("redirect_uri", config.google_callback_url())
        .append_pair("response_type", "code")
        .append_pair("scope", SCOPES)
        .append_pair("state", state);
    Ok(url.into())
}

/// Exchange the authorization code for an access token.
///
/// Transient provider failures surface immediately; there is no retry.
async fn exchange_code(
    http: &reqwest::Client,
    config: &AuthConfig,
    code: &str,
) -> Result<TokenResponse> {
    let params = [
        ("code", code),
        ("client_id", config.google_client_id()),
        ("client_secret", config.google_client_secret().expose_secret()),
        ("redirect_uri", config.google_callback_url()),
        ("grant_type", "authorization_code"),
    ];

    let response = http
        .post(TOKEN_ENDPOINT)
        .form(&params)
        .send()
        .await
        .context("token exchange request failed")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("token exchange failed: {status}"));
    }

    response
        .json::<TokenResponse>()
        .await
        .context("invalid token response")
}

async fn fetch_userinfo(http: &reqwest::Client, access_token: &str) -> Result<UserInfo> {
    let response = http
        .get(USERINFO_ENDPOINT)
        .bearer_auth(access_token)
        .send()
        .await
        .context("userinfo request failed")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("userinfo fetch failed: {status}"));
    }

    response
        .json::<UserInfo>()
        .await
        .context("invalid userinfo response")
}

fn failure_response(config: &AuthConfig) -> axum::response::Response {
    let mut headers = HeaderMap::new();
    if let Ok(clear) = clear_state_cookie(config) {
        headers.insert(SET_COOKIE, clear);
    }
    (headers, Redirect::to("/login")).into_response()
}

fn state_cookie(config: &AuthConfig, state: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = config.session_cookie_secure();
    let mut cookie = format!(
        "{STATE_COOKIE_NAME}={state}; Path=/; HttpOnly; SameSite=Lax; Max-Age={STATE_COOKIE_MAX_AGE_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_state_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let secure = config.session_cookie_secure();
    let mut cookie = format!("{STATE_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config() -> AuthConfig {
        AuthConfig::new(
            "https://segreti.dev".to_string(),
            "client-id".to_string(),
            SecretString::from("client-secret".to_string()),
            "https://segreti.dev/auth/google/secrets".to_string(),
        )
    }

    #[test]
    fn authorization_url_carries_client_and_scopes() -> Result<()> {
        let url = authorization_url(&config(), "nonce123")?;
        let parsed = Url::parse(&url)?;

        assert_eq!(parsed.host_str(), Some("accounts.google.com"));
        assert_eq!(parsed.path(), "/o/oauth2/v2/auth");

        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("client_id".to_string(), "client-id".to_string())));
        assert!(pairs.contains(&(
            "redirect_uri".to_string(),
            "https://segreti.dev/auth/google/secrets".to_string()
        )));
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&("scope".to_string(), "profile email".to_string())));
        assert!(pairs.contains(&("state".to_string(), "nonce123".to_string())));
        Ok(())
    }

    #[test]
    fn state_cookie_is_short_lived_and_http_only() {
        let cookie = state_cookie(&config(), "nonce123")
            .ok()
            .and_then(|value| value.to_str().map(str::to_string).ok());
        assert_eq!(
            cookie.as_deref(),
            Some(
                "segreti_oauth_state=nonce123; Path=/; HttpOnly; SameSite=Lax; Max-Age=600; Secure"
            )
        );
    }

    #[test]
    fn clear_state_cookie_expires_immediately() {
        let cookie = clear_state_cookie(&config())
            .ok()
            .and_then(|value| value.to_str().map(str::to_string).ok());
        assert!(cookie.is_some_and(|c| c.contains("Max-Age=0")));
    }

    #[test]
    fn userinfo_parses_google_payload() -> Result<()> {
        let profile: UserInfo = serde_json::from_str(
            r#"{"sub":"g-123","email":"b@x.com","email_verified":true,"name":"B"}"#,
        )?;
        assert_eq!(profile.sub, "g-123");
        assert_eq!(profile.email.as_deref(), Some("b@x.com"));
        Ok(())
    }

    #[test]
    fn userinfo_email_is_optional() -> Result<()> {
        let profile: UserInfo = serde_json::from_str(r#"{"sub":"g-123"}"#)?;
        assert_eq!(profile.sub, "g-123");
        assert!(profile.email.is_none());
        Ok(())
    }

    #[test]
    fn token_response_parses_access_token() -> Result<()> {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"ya29.a0","expires_in":3599,"token_type":"Bearer"}"#,
        )?;
        assert_eq!(token.access_token, "ya29.a0");
        Ok(())
    }
}
