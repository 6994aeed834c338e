//! SSH authentication methods.

use std::path::PathBuf;

/// SSH authentication method.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// Password authentication.
    Password(String),
    /// Private key authentication.
    Key {
        /// Private key path.
        path: PathBuf,
        /// Passphrase for the key (if encrypted).
        passphrase: Option<String>,
    },
    /// SSH agent authentication.
    Agent,
}

impl AuthMethod {
    /// Create password auth.
    #[must_use]
    pub fn password(password: impl Into<String>) -> Self {
        Self::Password(password.into())
    }

    /// Create private key auth.
    #[must_use]
    pub fn key(path: impl Into<PathBuf>) -> Self {
        Self::Key {
            path: path.into(),
            passphrase: None,
        }
    }

    /// Create private key auth with passphrase.
    #[must_use]
    pub fn key_with_passphrase(path: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self::Key {
            path: path.into(),
            passphrase: Some(passphrase.into()),
        }
    }

    /// Check if this is password auth.
    #[must_use]
    pub const fn is_password(&self) -> bool {
        matches!(self, Self::Password(_))
    }

    /// Check if this is private key auth.
    #[must_use]
    pub const fn is_key(&self) -> bool {
        matches!(self, Self::Key { .. })
    }
}

/// SSH credentials: a username plus authentication methods tried in order.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Authentication methods to try (in order).
    pub methods: Vec<AuthMethod>,
}

impl Credentials {
    /// Create new credentials.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            methods: Vec::new(),
        }
    }

    /// Add an authentication method.
    #[must_use]
    pub fn with_auth(mut self, method: AuthMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Add password authentication.
    #[must_use]
    pub fn with_password(self, password: impl Into<String>) -> Self {
        self.with_auth(AuthMethod::password(password))
    }

    /// Add private key authentication.
    #[must_use]
    pub fn with_key(self, path: impl Into<PathBuf>) -> Self {
        self.with_auth(AuthMethod::key(path))
    }

    /// Add agent authentication.
    #[must_use]
    pub fn with_agent(self) -> Self {
        self.with_auth(AuthMethod::Agent)
    }

    /// Create with default authentication (agent, then the usual key paths).
    #[must_use]
    pub fn with_defaults(self) -> Self {
        let home = std::env::var("HOME").unwrap_or_default();
        self.with_agent()
            .with_key(format!("{home}/.ssh/id_ed25519"))
            .with_key(format!("{home}/.ssh/id_rsa"))
    }
}

impl Default for Credentials {
    fn default() -> Self {
        let username = std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "root".to_string());
        Self::new(username)
    }
}

/// Host key verification policy.
///
/// The default is [`AcceptAll`](Self::AcceptAll): this library targets lab
/// clusters whose nodes are provisioned and re-imaged constantly, where every
/// reinstall mints a new host key and pinning produces nothing but false
/// alarms. Do not point it at hosts reachable from untrusted networks:
/// accepting any key permits man-in-the-middle interception there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostVerification {
    /// Accept any host key without verification.
    #[default]
    AcceptAll,
    /// Reject hosts whose key has not been supplied out of band.
    RejectUnknown,
}
