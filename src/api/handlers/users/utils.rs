//! Helpers for account validation, code/token generation, and credential
//! hashing.

use anyhow::{Context, Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{Rng, RngCore, rngs::OsRng};
use regex::Regex;

pub(super) const USERNAME_MAX_LENGTH: usize = 150;

pub(super) const CONFIRMATION_CODE_LENGTH: usize = 6;

/// Usernames allow letters, digits and `@ . + - _`, 1 to 150 characters.
pub(super) fn valid_username(username: &str) -> bool {
    if username.is_empty() || username.chars().count() > USERNAME_MAX_LENGTH {
        return false;
    }
    Regex::new(r"^[\w.@+-]+$").is_ok_and(|regex| regex.is_match(username))
}

/// Confirmation codes are exactly six ASCII digits.
pub(super) fn valid_code(code: &str) -> bool {
    code.len() == CONFIRMATION_CODE_LENGTH && code.bytes().all(|byte| byte.is_ascii_digit())
}

/// Create a confirmation code, each digit drawn uniformly from 0-9.
///
/// Codes are per-account secrets, not global identifiers; collisions across
/// accounts are allowed.
pub(super) fn generate_confirmation_code() -> String {
    let mut rng = OsRng;
    (0..CONFIRMATION_CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Create a new session token for the bearer credential.
///
/// The value is stored as issued so repeated logins can return the same
/// token.
pub(super) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Hash a password into a PHC string for storage.
pub(super) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Verify a password against a stored PHC string.
pub(super) fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23503"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn valid_username_accepts_common_forms() {
        assert!(valid_username("alice"));
        assert!(valid_username("alice.smith@example.com"));
        assert!(valid_username("user_2024+test"));
        assert!(valid_username("a"));
    }

    #[test]
    fn valid_username_rejects_empty_and_long() {
        assert!(!valid_username(""));
        assert!(!valid_username(&"a".repeat(USERNAME_MAX_LENGTH + 1)));
    }

    #[test]
    fn valid_username_accepts_max_length() {
        assert!(valid_username(&"a".repeat(USERNAME_MAX_LENGTH)));
    }

    #[test]
    fn valid_username_rejects_whitespace_and_symbols() {
        assert!(!valid_username("alice smith"));
        assert!(!valid_username("alice#1"));
        assert!(!valid_username("alice/"));
    }

    #[test]
    fn valid_code_accepts_six_digits() {
        assert!(valid_code("000000"));
        assert!(valid_code("123456"));
    }

    #[test]
    fn valid_code_rejects_wrong_length_or_alpha() {
        assert!(!valid_code("12345"));
        assert!(!valid_code("1234567"));
        assert!(!valid_code("12a456"));
        assert!(!valid_code(""));
    }

    #[test]
    fn generated_code_is_six_digits() {
        for _ in 0..32 {
            let code = generate_confirmation_code();
            assert!(valid_code(&code), "unexpected code: {code}");
        }
    }

    #[test]
    fn generated_tokens_are_unique_and_url_safe() -> anyhow::Result<()> {
        let first = generate_session_token()?;
        let second = generate_session_token()?;
        assert_ne!(first, second);
        assert_eq!(Base64UrlUnpadded::decode_vec(&first).map(|b| b.len()), Ok(32));
        Ok(())
    }

    #[test]
    fn password_hash_round_trip() -> anyhow::Result<()> {
        let hash = hash_password("secret123!")?;
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123!", &hash));
        assert!(!verify_password("wrong", &hash));
        Ok(())
    }

    #[test]
    fn verify_password_rejects_garbage_hash() {
        assert!(!verify_password("secret123!", "not-a-phc-string"));
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn is_foreign_key_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23503"),
        }));
        assert!(is_foreign_key_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(!is_foreign_key_violation(&err));
    }
}
