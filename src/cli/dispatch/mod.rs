//! Command-line argument dispatch and server initialization.
//!
//! This module maps validated CLI arguments to the appropriate action, such
//! as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{auth, database};
use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let database_opts = database::Options::parse(matches);
    let auth_opts = auth::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn,
        globals: GlobalArgs::new(database_opts.username, database_opts.password),
        password_min_length: auth_opts.password_min_length,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_action_from_matches() {
        temp_env::with_vars(
            [
                ("TIENDA_DB_USERNAME", None::<&str>),
                ("TIENDA_DB_PASSWORD", None::<&str>),
                ("TIENDA_PASSWORD_MIN_LENGTH", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "tienda",
                    "--dsn",
                    "postgres://user@localhost:5432/tienda",
                    "--port",
                    "9090",
                ]);
                let action = handler(&matches);
                assert!(action.is_ok());
                if let Ok(Action::Server(args)) = action {
                    assert_eq!(args.port, 9090);
                    assert_eq!(args.dsn, "postgres://user@localhost:5432/tienda");
                    assert_eq!(args.password_min_length, 8);
                    assert!(args.globals.db_username.is_none());
                }
            },
        );
    }
}
