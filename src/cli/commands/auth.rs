//! Account-policy arguments.

use clap::{Arg, Command};

pub const ARG_PASSWORD_MIN_LENGTH: &str = "password-min-length";

pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_PASSWORD_MIN_LENGTH)
            .long("password-min-length")
            .help("Minimum accepted password length for registration")
            .env("TIENDA_PASSWORD_MIN_LENGTH")
            .default_value("8")
            .value_parser(clap::value_parser!(usize)),
    )
}

#[derive(Debug)]
pub struct Options {
    pub password_min_length: usize,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        Self {
            password_min_length: matches
                .get_one::<usize>(ARG_PASSWORD_MIN_LENGTH)
                .copied()
                .unwrap_or(DEFAULT_PASSWORD_MIN_LENGTH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Command;

    fn command() -> Command {
        with_args(Command::new("tienda"))
    }

    #[test]
    fn password_min_length_defaults_to_eight() {
        temp_env::with_vars([("TIENDA_PASSWORD_MIN_LENGTH", None::<&str>)], || {
            let matches = command().get_matches_from(vec!["tienda"]);
            let options = Options::parse(&matches);
            assert_eq!(options.password_min_length, 8);
        });
    }

    #[test]
    fn password_min_length_from_env() {
        temp_env::with_vars([("TIENDA_PASSWORD_MIN_LENGTH", Some("12"))], || {
            let matches = command().get_matches_from(vec!["tienda"]);
            let options = Options::parse(&matches);
            assert_eq!(options.password_min_length, 12);
        });
    }

    #[test]
    fn password_min_length_from_flag() {
        temp_env::with_vars([("TIENDA_PASSWORD_MIN_LENGTH", None::<&str>)], || {
            let matches =
                command().get_matches_from(vec!["tienda", "--password-min-length", "10"]);
            let options = Options::parse(&matches);
            assert_eq!(options.password_min_length, 10);
        });
    }
}
