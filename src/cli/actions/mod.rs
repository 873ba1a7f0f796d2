pub mod server;

use self::server::Args;

/// Actions the CLI can dispatch to.
#[derive(Debug)]
pub enum Action {
    Server(Args),
}
