use std::fmt;

/// Scheme name for `username:password` secrets.
pub const USERNAME_PASSWORD_SCHEME: &str = "Username:Password";

/// Login credentials for a single attempt. Never persisted by this crate.
#[derive(Clone)]
pub struct Credentials {
    scheme: String,
    secret: String,
}

impl Credentials {
    pub fn new(scheme: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            secret: secret.into(),
        }
    }

    pub fn username_password(username: &str, password: &str) -> Self {
        Self::new(USERNAME_PASSWORD_SCHEME, format!("{}:{}", username, password))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The principal named by a `Username:Password` secret.
    pub fn username(&self) -> Option<&str> {
        if self.scheme != USERNAME_PASSWORD_SCHEME {
            return None;
        }
        self.secret.split_once(':').map(|(user, _)| user)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("scheme", &self.scheme)
            .field("secret", &"<redacted>")
            .finish()
    }
}
