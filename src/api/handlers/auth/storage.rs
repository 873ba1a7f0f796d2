//! Database helpers for users, sessions, and the secrets board.

use anyhow::{anyhow, Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::error::AuthError;
use super::utils::{generate_session_token, hash_session_token, is_unique_violation};

const USER_COLUMNS: &str = "id, username, password_hash, google_id";

/// Credential-relevant projection of a user row.
#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) password_hash: Option<String>,
    pub(crate) google_id: Option<String>,
}

/// Minimal data returned for a valid session cookie.
#[derive(Debug, Clone)]
pub(crate) struct SessionRecord {
    pub(crate) user_id: Uuid,
    pub(crate) username: String,
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        google_id: row.get("google_id"),
    }
}

/// Insert a new local-credential user.
///
/// A unique violation on `username` surfaces as `DuplicateUsername`; the
/// first registration's record is never touched.
pub(crate) async fn create_local_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let query = format!(
        "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(user_from_row(&row)),
        Err(err) if is_unique_violation(&err) => Err(AuthError::DuplicateUsername),
        Err(err) => Err(AuthError::Store(
            anyhow::Error::new(err).context("failed to insert user"),
        )),
    }
}

pub(crate) async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(username)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by username")?;

    Ok(row.map(|row| user_from_row(&row)))
}

pub(crate) async fn find_by_google_id(pool: &PgPool, google_id: &str) -> Result<Option<User>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE google_id = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(google_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by google id")?;

    Ok(row.map(|row| user_from_row(&row)))
}

async fn insert_google_user(
    pool: &PgPool,
    google_id: &str,
    email: &str,
) -> Result<User, sqlx::Error> {
    let query = format!(
        "INSERT INTO users (username, google_id) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .bind(google_id)
        .fetch_one(pool)
        .instrument(span)
        .await?;

    Ok(user_from_row(&row))
}

/// Resolve a federated identity to a local user, creating one on first login.
///
/// Race-safe without check-then-insert: the unique constraint on `google_id`
/// decides concurrent identical inserts, and the loser retries as a lookup.
/// A unique violation on `username` instead means a local account already
/// owns the email; that is surfaced as `AuthFailed` rather than silently
/// linking the identities.
pub(crate) async fn find_or_create_google_user(
    pool: &PgPool,
    google_id: &str,
    email: &str,
) -> Result<User, AuthError> {
    if let Some(user) = find_by_google_id(pool, google_id).await? {
        return Ok(user);
    }

    match insert_google_user(pool, google_id, email).await {
        Ok(user) => Ok(user),
        Err(err) if is_unique_violation(&err) => {
            match find_by_google_id(pool, google_id).await? {
                Some(user) => Ok(user),
                None => Err(AuthError::AuthFailed),
            }
        }
        Err(err) => Err(AuthError::Store(
            anyhow::Error::new(err).context("failed to insert federated user"),
        )),
    }
}

/// Overwrite a user's secret (submissions replace, never append).
pub(crate) async fn update_secret(
    pool: &PgPool,
    user_id: Uuid,
    secret: &str,
) -> Result<(), AuthError> {
    let query = "UPDATE users SET secret = $2, updated_at = NOW() WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .bind(secret)
        .execute(pool)
        .instrument(span)
        .await
        .map_err(|err| AuthError::Store(anyhow::Error::new(err).context("failed to update secret")))?;

    if result.rows_affected() == 0 {
        return Err(AuthError::NotFound);
    }

    Ok(())
}

/// Secret text of every user with a non-empty secret, for the public board.
/// The board is anonymous, so usernames are not selected. Order is not
/// guaranteed.
pub(crate) async fn list_with_secret(pool: &PgPool) -> Result<Vec<String>> {
    let query = r"
        SELECT secret
        FROM users
        WHERE secret IS NOT NULL AND secret <> ''
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list secrets")?;

    Ok(rows.iter().map(|row| row.get("secret")).collect())
}

pub(crate) async fn insert_session(
    pool: &PgPool,
    user_id: Uuid,
    ttl_seconds: i64,
) -> Result<String> {
    // Generate a random token, store only its hash, and return the raw value
    // so the caller can set the session cookie.
    let query = r"
        INSERT INTO user_sessions (user_id, session_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );

    for _ in 0..3 {
        let token = generate_session_token()?;
        let token_hash = hash_session_token(&token);
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(token_hash)
            .bind(ttl_seconds)
            .execute(pool)
            .instrument(span.clone())
            .await;

        match result {
            Ok(_) => return Ok(token),
            Err(err) if is_unique_violation(&err) => {}
            Err(err) => return Err(err).context("failed to insert session"),
        }
    }

    Err(anyhow!("failed to generate unique session token"))
}

pub(crate) async fn lookup_session(
    pool: &PgPool,
    token_hash: &[u8],
) -> Result<Option<SessionRecord>> {
    // Only accept unexpired sessions whose user still exists.
    let query = r"
        SELECT users.id, users.username
        FROM user_sessions
        JOIN users ON users.id = user_sessions.user_id
        WHERE user_sessions.session_hash = $1
          AND user_sessions.expires_at > NOW()
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    if row.is_none() {
        return Ok(None);
    }

    // Record activity for audit/visibility without extending the session TTL.
    let query = r"
        UPDATE user_sessions
        SET last_seen_at = NOW()
        WHERE session_hash = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update session last_seen_at")?;

    Ok(row.map(|row| SessionRecord {
        user_id: row.get("id"),
        username: row.get("username"),
    }))
}

pub(crate) async fn delete_session(pool: &PgPool, token_hash: &[u8]) -> Result<()> {
    // Logout is idempotent; it's fine if no rows are deleted.
    let query = "DELETE FROM user_sessions WHERE session_hash = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{SessionRecord, User};
    use uuid::Uuid;

    #[test]
    fn user_holds_values() {
        let user = User {
            id: Uuid::nil(),
            username: "alice@example.com".to_string(),
            password_hash: Some("$argon2id$...".to_string()),
            google_id: None,
        };
        assert_eq!(user.id, Uuid::nil());
        assert_eq!(user.username, "alice@example.com");
        assert!(user.password_hash.is_some());
        assert!(user.google_id.is_none());
    }

    #[test]
    fn session_record_holds_values() {
        let record = SessionRecord {
            user_id: Uuid::nil(),
            username: "alice@example.com".to_string(),
        };
        assert_eq!(record.user_id, Uuid::nil());
        assert_eq!(record.username, "alice@example.com");
    }
}
