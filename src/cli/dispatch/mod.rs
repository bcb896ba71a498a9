//! Map parsed CLI arguments to an action.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::ARG_PORT;
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    Ok(Action::Server(Args { port }))
}
