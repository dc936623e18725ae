//! Database credential arguments.
//!
//! Username/password may be supplied separately from the DSN (for example
//! from an injected secret file) and are spliced into the connection URL
//! before the pool is created.

use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_DB_USERNAME: &str = "db-username";
pub const ARG_DB_PASSWORD: &str = "db-password";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DB_USERNAME)
                .long("db-username")
                .help("Database username, overrides the one in the DSN")
                .env("TIENDA_DB_USERNAME"),
        )
        .arg(
            Arg::new(ARG_DB_PASSWORD)
                .long("db-password")
                .help("Database password, overrides the one in the DSN")
                .env("TIENDA_DB_PASSWORD"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            username: matches.get_one::<String>(ARG_DB_USERNAME).cloned(),
            password: matches
                .get_one::<String>(ARG_DB_PASSWORD)
                .map(|password| SecretString::from(password.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;
    use secrecy::ExposeSecret;

    fn command() -> Command {
        with_args(Command::new("tienda"))
    }

    #[test]
    fn credentials_absent_by_default() {
        temp_env::with_vars(
            [
                ("TIENDA_DB_USERNAME", None::<&str>),
                ("TIENDA_DB_PASSWORD", None::<&str>),
            ],
            || {
                let matches = command().get_matches_from(vec!["tienda"]);
                let options = Options::parse(&matches);
                assert!(options.username.is_none());
                assert!(options.password.is_none());
            },
        );
    }

    #[test]
    fn credentials_from_env() {
        temp_env::with_vars(
            [
                ("TIENDA_DB_USERNAME", Some("shop")),
                ("TIENDA_DB_PASSWORD", Some("hunter2")),
            ],
            || {
                let matches = command().get_matches_from(vec!["tienda"]);
                let options = Options::parse(&matches);
                assert_eq!(options.username.as_deref(), Some("shop"));
                assert_eq!(
                    options.password.map(|p| p.expose_secret().to_string()),
                    Some("hunter2".to_string())
                );
            },
        );
    }
}
