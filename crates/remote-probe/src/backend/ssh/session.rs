//! SSH session management.
//!
//! A session owns one authenticated connection to a single remote host. It is
//! exclusively owned by the caller that created it: a thread (or task) that
//! needs its own connection creates its own session.

use std::sync::Arc;
use std::time::Duration;

use russh::client;
use russh::keys::{PrivateKeyWithHashAlg, PublicKey};

use super::auth::{AuthMethod, Credentials, HostVerification};
use super::channel::ExecChannel;
use crate::error::{ProbeError, Result};

/// Default drain chunk size for exec channels.
pub const DEFAULT_DRAIN_CHUNK: usize = 8192;

/// SSH session configuration.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Host to connect to.
    pub host: String,
    /// Port (default 22).
    pub port: u16,
    /// Credentials.
    pub credentials: Credentials,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Host key verification policy.
    pub host_verification: HostVerification,
    /// Maximum bytes handed out per channel event.
    pub drain_chunk: usize,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 22,
            credentials: Credentials::default(),
            connect_timeout: Duration::from_secs(30),
            host_verification: HostVerification::default(),
            drain_chunk: DEFAULT_DRAIN_CHUNK,
        }
    }
}

impl SshConfig {
    /// Create new config for a host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Set port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set username.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.credentials.username = username.into();
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set host key verification.
    #[must_use]
    pub const fn host_verification(mut self, policy: HostVerification) -> Self {
        self.host_verification = policy;
        self
    }

    /// Set the maximum bytes handed out per channel event.
    #[must_use]
    pub const fn drain_chunk(mut self, chunk: usize) -> Self {
        self.drain_chunk = chunk;
        self
    }

    /// Get the address string.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// SSH session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SshSessionState {
    /// Not connected.
    Disconnected,
    /// Connecting.
    Connecting,
    /// Authenticating.
    Authenticating,
    /// Connected and ready.
    Connected,
    /// Error state.
    Error,
}

/// Client handler for russh that applies the host key policy.
pub struct ClientHandler {
    verification: HostVerification,
    host: String,
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.verification {
            HostVerification::AcceptAll => {
                tracing::debug!(
                    host = %self.host,
                    key = ?server_public_key.algorithm(),
                    "accepting server key without verification"
                );
                Ok(true)
            }
            HostVerification::RejectUnknown => {
                tracing::warn!(host = %self.host, "rejecting unknown host key");
                Ok(false)
            }
        }
    }
}

/// An authenticated SSH connection to a single remote host.
pub struct SshSession {
    config: SshConfig,
    state: SshSessionState,
    handle: Option<client::Handle<ClientHandler>>,
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("connected", &self.handle.is_some())
            .finish()
    }
}

impl SshSession {
    /// Create a new, disconnected session.
    #[must_use]
    pub const fn new(config: SshConfig) -> Self {
        Self {
            config,
            state: SshSessionState::Disconnected,
            handle: None,
        }
    }

    /// Get configuration.
    #[must_use]
    pub const fn config(&self) -> &SshConfig {
        &self.config
    }

    /// Get current state.
    #[must_use]
    pub const fn state(&self) -> SshSessionState {
        self.state
    }

    /// Check if connected.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, SshSessionState::Connected) && self.handle.is_some()
    }

    /// Establish the TCP connection, perform the SSH handshake, and
    /// authenticate with the configured credentials.
    ///
    /// The whole sequence is bounded by the configured connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Connection`] if the transport cannot be
    /// established (including timeout), or [`ProbeError::Authentication`]
    /// once every configured method has been rejected.
    pub async fn connect(&mut self) -> Result<()> {
        self.state = SshSessionState::Connecting;

        let ssh_config = Arc::new(client::Config::default());
        let handler = ClientHandler {
            verification: self.config.host_verification,
            host: self.config.host.clone(),
        };

        let addr = (self.config.host.as_str(), self.config.port);
        tracing::info!(
            host = %self.config.host,
            port = %self.config.port,
            "connecting to remote host"
        );

        let mut handle = tokio::time::timeout(
            self.config.connect_timeout,
            client::connect(ssh_config, addr, handler),
        )
        .await
        .map_err(|_| {
            self.state = SshSessionState::Error;
            ProbeError::connection(
                &self.config.host,
                self.config.port,
                format!("timed out after {:?}", self.config.connect_timeout),
            )
        })?
        .map_err(|e| {
            self.state = SshSessionState::Error;
            ProbeError::connection(&self.config.host, self.config.port, e.to_string())
        })?;

        self.state = SshSessionState::Authenticating;
        if let Err(e) = authenticate(&mut handle, &self.config.credentials).await {
            self.state = SshSessionState::Error;
            return Err(e);
        }

        self.state = SshSessionState::Connected;
        self.handle = Some(handle);

        tracing::info!(
            host = %self.config.host,
            user = %self.config.credentials.username,
            "connection established"
        );

        Ok(())
    }

    /// Gracefully disconnect from the remote host.
    pub async fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle
                .disconnect(russh::Disconnect::ByApplication, "", "en")
                .await;
        }
        self.state = SshSessionState::Disconnected;
    }

    /// Open a channel and issue `command` on it.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Execution`] if the session is not connected or
    /// the exec request fails.
    pub async fn exec(&mut self, command: &str) -> Result<ExecChannel> {
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| ProbeError::execution("session is not connected"))?;

        let mut channel = handle
            .channel_open_session()
            .await
            .map_err(|e| ProbeError::execution(format!("channel open failed: {e}")))?;

        tracing::debug!(host = %self.config.host, command = %command, "executing command");

        channel
            .exec(false, command)
            .await
            .map_err(|e| ProbeError::execution(format!("exec request failed: {e}")))?;

        Ok(ExecChannel::new(channel, self.config.drain_chunk))
    }
}

/// Try each configured authentication method in order.
async fn authenticate(
    handle: &mut client::Handle<ClientHandler>,
    credentials: &Credentials,
) -> Result<()> {
    let username = &credentials.username;

    for method in &credentials.methods {
        match method {
            AuthMethod::Password(password) => {
                tracing::debug!(user = %username, "attempting password authentication");
                match handle.authenticate_password(username, password).await {
                    Ok(result) if result.success() => return Ok(()),
                    Ok(_) => {
                        tracing::debug!(user = %username, "password authentication rejected");
                    }
                    Err(e) => {
                        tracing::debug!(user = %username, error = %e, "password authentication error");
                    }
                }
            }
            AuthMethod::Key { path, passphrase } => {
                tracing::debug!(
                    user = %username,
                    key = %path.display(),
                    "attempting private key authentication"
                );
                let key = match load_private_key(path, passphrase.as_deref()).await {
                    Ok(key) => key,
                    Err(e) => {
                        tracing::debug!(
                            user = %username,
                            key = %path.display(),
                            error = %e,
                            "failed to load private key"
                        );
                        continue;
                    }
                };

                let rsa_hash = handle.best_supported_rsa_hash().await.ok().flatten().flatten();
                let key_with_hash = PrivateKeyWithHashAlg::new(key, rsa_hash);

                match handle.authenticate_publickey(username, key_with_hash).await {
                    Ok(result) if result.success() => return Ok(()),
                    Ok(_) => {
                        tracing::debug!(user = %username, "private key rejected");
                    }
                    Err(e) => {
                        tracing::debug!(user = %username, error = %e, "private key authentication error");
                    }
                }
            }
            AuthMethod::Agent => {
                tracing::debug!(user = %username, "attempting agent authentication");

                #[cfg(unix)]
                {
                    let Ok(mut agent) =
                        russh::keys::agent::client::AgentClient::connect_env().await
                    else {
                        tracing::debug!(user = %username, "no SSH agent available");
                        continue;
                    };

                    let keys = match agent.request_identities().await {
                        Ok(keys) => keys,
                        Err(e) => {
                            tracing::debug!(user = %username, error = %e, "failed to list agent identities");
                            continue;
                        }
                    };

                    for key in keys {
                        let rsa_hash =
                            handle.best_supported_rsa_hash().await.ok().flatten().flatten();

                        match handle
                            .authenticate_publickey_with(
                                username,
                                key.clone(),
                                rsa_hash,
                                &mut agent,
                            )
                            .await
                        {
                            Ok(result) if result.success() => return Ok(()),
                            Ok(_) => {
                                tracing::debug!(
                                    user = %username,
                                    key_type = %key.algorithm().as_str(),
                                    "agent key rejected, trying next"
                                );
                            }
                            Err(e) => {
                                tracing::debug!(user = %username, error = %e, "agent authentication error");
                            }
                        }
                    }
                }

                #[cfg(not(unix))]
                tracing::debug!(
                    user = %username,
                    "agent authentication not supported on this platform"
                );
            }
        }
    }

    Err(ProbeError::authentication(
        username,
        "all authentication methods exhausted",
    ))
}

/// Load a private key from a file, decrypting it if a passphrase is given.
async fn load_private_key(
    path: &std::path::Path,
    passphrase: Option<&str>,
) -> Result<Arc<russh::keys::PrivateKey>> {
    let key_str = tokio::fs::read_to_string(path).await.map_err(|e| {
        ProbeError::authentication(
            String::new(),
            format!("failed to read key file {}: {e}", path.display()),
        )
    })?;

    let key = russh::keys::decode_secret_key(&key_str, passphrase).map_err(|e| {
        ProbeError::authentication(
            String::new(),
            format!("failed to decode key {}: {e}", path.display()),
        )
    })?;

    Ok(Arc::new(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssh_config_builder() {
        let config = SshConfig::new("mon0.lab").port(2222).username("qa");

        assert_eq!(config.host, "mon0.lab");
        assert_eq!(config.port, 2222);
        assert_eq!(config.credentials.username, "qa");
        assert_eq!(config.address(), "mon0.lab:2222");
    }

    #[test]
    fn ssh_config_defaults() {
        let config = SshConfig::default();
        assert_eq!(config.port, 22);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.drain_chunk, DEFAULT_DRAIN_CHUNK);
        assert_eq!(config.host_verification, HostVerification::AcceptAll);
    }

    #[test]
    fn new_session_is_disconnected() {
        let session = SshSession::new(SshConfig::new("mon0.lab"));
        assert_eq!(session.state(), SshSessionState::Disconnected);
        assert!(!session.is_connected());
    }
}
