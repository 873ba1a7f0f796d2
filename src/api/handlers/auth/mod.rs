//! Auth handlers and supporting modules.
//!
//! This module coordinates local credential authentication, Google federated
//! login, and session management.
//!
//! ## Local credentials
//!
//! Passwords are hashed with Argon2id; verification burns the same hashing
//! cost whether or not the username exists, so unknown accounts are not
//! distinguishable by response time.
//!
//! ## Sessions
//!
//! Session tokens are random values carried in an `HttpOnly` cookie; the
//! database stores only their SHA-256 hash together with an expiry enforced
//! at lookup time.

pub(crate) mod error;
pub(crate) mod google;
pub(crate) mod login;
pub(crate) mod password;
pub(crate) mod register;
pub(crate) mod session;
mod state;
pub(crate) mod storage;
pub(crate) mod types;
pub(crate) mod utils;

pub use state::{AuthConfig, AuthState};
