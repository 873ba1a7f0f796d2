use crate::api;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::SecretString;

/// Validated server configuration produced by CLI dispatch.
#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub base_url: String,
    pub session_ttl_seconds: i64,
    pub google_client_id: String,
    pub google_client_secret: SecretString,
    pub google_callback_url: String,
}

/// Handle the server action
///
/// # Errors
/// Returns an error if the server fails to start
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => {
            let config = AuthConfig::new(
                args.base_url,
                args.google_client_id,
                args.google_client_secret,
                args.google_callback_url,
            )
            .with_session_ttl_seconds(args.session_ttl_seconds);

            api::new(args.port, args.dsn, config).await?;
        }
    }

    Ok(())
}
