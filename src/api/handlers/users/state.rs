//! Account-policy configuration shared by the user handlers.

const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;

/// Registration/login policy knobs, wired from the CLI.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    password_min_length: usize,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
        }
    }

    #[must_use]
    pub fn with_password_min_length(mut self, password_min_length: usize) -> Self {
        self.password_min_length = password_min_length;
        self
    }

    #[must_use]
    pub fn password_min_length(&self) -> usize {
        self.password_min_length
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_password_min_length() {
        assert_eq!(AuthConfig::new().password_min_length(), 8);
    }

    #[test]
    fn builder_overrides_password_min_length() {
        let config = AuthConfig::new().with_password_min_length(12);
        assert_eq!(config.password_min_length(), 12);
    }
}
