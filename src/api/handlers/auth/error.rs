//! Error taxonomy for the auth and board flows.
//!
//! Handlers convert these into redirects to a safe fallback page at the
//! route boundary; only store failures surface as 500s.

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AuthError {
    /// Username or federated id already taken.
    #[error("username already registered")]
    DuplicateUsername,

    /// Unknown username or wrong password; the two are never distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Provider exchange, profile resolution, or identity linking failed.
    #[error("federated authentication failed")]
    AuthFailed,

    /// Record vanished between lookup and mutation.
    #[error("record not found")]
    NotFound,

    /// Session could not be established after successful authentication.
    #[error("failed to establish session")]
    LoginError(#[source] anyhow::Error),

    /// Infrastructure failure talking to the store.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::AuthError;
    use anyhow::anyhow;

    #[test]
    fn error_messages_are_stable() {
        assert_eq!(
            AuthError::DuplicateUsername.to_string(),
            "username already registered"
        );
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid credentials"
        );
        assert_eq!(
            AuthError::AuthFailed.to_string(),
            "federated authentication failed"
        );
        assert_eq!(AuthError::NotFound.to_string(), "record not found");
        assert_eq!(
            AuthError::LoginError(anyhow!("boom")).to_string(),
            "failed to establish session"
        );
    }

    #[test]
    fn store_errors_are_transparent() {
        let err = AuthError::from(anyhow!("connection refused"));
        assert_eq!(err.to_string(), "connection refused");
    }
}
