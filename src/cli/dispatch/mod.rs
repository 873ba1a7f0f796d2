//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the server with its full
//! configuration state.

use crate::cli::actions::{server::Args, Action};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(3000);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let base_url = matches
        .get_one::<String>("base-url")
        .cloned()
        .context("missing required argument: --base-url")?;
    let session_ttl_seconds = matches
        .get_one::<i64>("session-ttl-seconds")
        .copied()
        .unwrap_or(604_800);
    let google_client_id = matches
        .get_one::<String>("google-client-id")
        .cloned()
        .context("missing required argument: --google-client-id")?;
    let google_client_secret = matches
        .get_one::<String>("google-client-secret")
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --google-client-secret")?;
    let google_callback_url = matches
        .get_one::<String>("google-callback-url")
        .cloned()
        .context("missing required argument: --google-callback-url")?;

    Ok(Action::Server(Args {
        port,
        dsn,
        base_url,
        session_ttl_seconds,
        google_client_id,
        google_client_secret,
        google_callback_url,
    }))
}
