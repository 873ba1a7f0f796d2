use clap::{Arg, Command};

pub fn with_args(command: Command) -> Command {
    let command = with_session_args(command);
    with_google_args(command)
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("Public base URL used for cookies and redirects")
                .env("SEGRETI_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session cookie TTL in seconds")
                .env("SEGRETI_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
}

fn with_google_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("google-client-id")
                .long("google-client-id")
                .help("Google OAuth client id")
                .env("SEGRETI_GOOGLE_CLIENT_ID")
                .required(true),
        )
        .arg(
            Arg::new("google-client-secret")
                .long("google-client-secret")
                .help("Google OAuth client secret")
                .env("SEGRETI_GOOGLE_CLIENT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("google-callback-url")
                .long("google-callback-url")
                .help("OAuth callback URL registered with Google")
                .env("SEGRETI_GOOGLE_CALLBACK_URL")
                .default_value("http://localhost:3000/auth/google/secrets"),
        )
}
