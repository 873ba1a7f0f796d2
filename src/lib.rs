//! # Segreti (shared secrets board)
//!
//! `segreti` is a small web service where users register with local
//! credentials or sign in with Google, and post a single free-text secret to
//! a shared public board.
//!
//! ## Authentication
//!
//! Local credentials are stored as Argon2id hashes; plaintext never touches
//! the database. Google sign-in uses the OAuth 2.0 authorization code flow
//! and links the provider's stable `sub` identifier to a local user record
//! via a race-safe find-or-create.
//!
//! ## Sessions
//!
//! Sessions are opaque random tokens carried in an `HttpOnly` cookie. The
//! database stores only the SHA-256 of the token, with a configurable TTL
//! enforced at lookup time.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
