//! Auth state and configuration.

use secrecy::SecretString;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Explicit configuration for sessions and the federated provider.
///
/// Built once at startup from CLI arguments and passed into the router
/// state; there is no ambient global configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    base_url: String,
    session_ttl_seconds: i64,
    google_client_id: String,
    google_client_secret: SecretString,
    google_callback_url: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(
        base_url: String,
        google_client_id: String,
        google_client_secret: SecretString,
        google_callback_url: String,
    ) -> Self {
        Self {
            base_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            google_client_id,
            google_client_secret,
            google_callback_url,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    pub(crate) fn google_client_id(&self) -> &str {
        &self.google_client_id
    }

    pub(crate) fn google_client_secret(&self) -> &SecretString {
        &self.google_client_secret
    }

    pub(crate) fn google_callback_url(&self) -> &str {
        &self.google_callback_url
    }
}

/// Shared state for the auth routes: configuration plus the outbound HTTP
/// client used for the provider round trips.
pub struct AuthState {
    config: AuthConfig,
    http: reqwest::Client,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthConfig, AuthState};
    use secrecy::{ExposeSecret, SecretString};

    fn config(base_url: &str) -> AuthConfig {
        AuthConfig::new(
            base_url.to_string(),
            "client-id".to_string(),
            SecretString::from("client-secret".to_string()),
            "http://localhost:3000/auth/google/secrets".to_string(),
        )
    }

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = config("https://segreti.dev");

        assert_eq!(config.base_url(), "https://segreti.dev");
        assert_eq!(
            config.session_ttl_seconds(),
            super::DEFAULT_SESSION_TTL_SECONDS
        );
        assert_eq!(config.google_client_id(), "client-id");
        assert_eq!(config.google_client_secret().expose_secret(), "client-secret");

        let config = config.with_session_ttl_seconds(3600);
        assert_eq!(config.session_ttl_seconds(), 3600);
    }

    #[test]
    fn session_cookie_secure_follows_base_url_scheme() {
        assert!(config("https://segreti.dev").session_cookie_secure());
        assert!(!config("http://localhost:3000").session_cookie_secure());
    }

    #[test]
    fn auth_state_exposes_config() {
        let state = AuthState::new(config("https://segreti.dev"), reqwest::Client::new());
        assert_eq!(state.config().base_url(), "https://segreti.dev");
    }
}
