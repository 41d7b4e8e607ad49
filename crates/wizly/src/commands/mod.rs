//! Command dispatch: bridges CLI args -> controller calls -> output formatting.

pub mod catalog;
pub mod config_cmd;
pub mod invitations;
pub mod status;
pub mod users;
pub mod util;
pub mod watch;

use wizly_core::{Controller, Endpoint};

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(controller, global).await,
        Command::Users(args) => users::handle(controller, args, global).await,
        Command::Invitations(args) => {
            invitations::handle(controller, args, resolved, global).await
        }
        Command::Libraries(args) => {
            catalog::handle(controller, Endpoint::Libraries, args, global).await
        }
        Command::Servers(args) => catalog::handle(controller, Endpoint::Servers, args, global).await,
        Command::ApiKeys(args) => catalog::handle(controller, Endpoint::ApiKeys, args, global).await,
        Command::Watch(args) => watch::handle(controller, args, global).await,
        // Config and Completions never reach dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
