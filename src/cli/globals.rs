use secrecy::SecretString;

/// Database credentials resolved outside the DSN.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub db_username: Option<String>,
    pub db_password: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(db_username: Option<String>, db_password: Option<SecretString>) -> Self {
        Self {
            db_username,
            db_password,
        }
    }
}
