//! Configuration for remote-probe.
//!
//! A harness loads one [`ProbeConfig`] at process start (file, then
//! environment overrides, then validation) and passes it to whatever needs
//! it. There is no lazily-populated global: a config that fails validation
//! fails before the first connection attempt.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProbeError, Result};

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default per-command timeout in seconds.
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Default sleep between polling ticks, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default bound on a polled wait, in seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 600;

/// Default maximum bytes handed out per channel event.
pub const DEFAULT_DRAIN_CHUNK: usize = 8192;

/// Environment variable prefix for overrides.
const ENV_PREFIX: &str = "REMOTE_PROBE_";

/// One target host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostEntry {
    /// Short name used to look the host up.
    pub name: String,
    /// Address to connect to.
    pub address: String,
    /// SSH port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user.
    pub user: String,
}

const fn default_port() -> u16 {
    22
}

/// Process-wide configuration, loaded and validated once.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Per-command timeout in seconds.
    pub command_timeout_secs: u64,
    /// Sleep between polling ticks, in seconds.
    pub poll_interval_secs: u64,
    /// Bound on a polled wait, in seconds.
    pub poll_timeout_secs: u64,
    /// Maximum bytes handed out per channel event.
    pub drain_chunk: usize,
    /// Target hosts.
    pub hosts: Vec<HostEntry>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            drain_chunk: DEFAULT_DRAIN_CHUNK,
            hosts: Vec::new(),
        }
    }
}

impl ProbeConfig {
    /// Load from a TOML file, apply `REMOTE_PROBE_*` environment overrides,
    /// and validate.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path.as_ref()).await?;
        let mut config = Self::from_toml(&text)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a TOML string without touching the environment.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ProbeError::config(e.to_string()))
    }

    /// Override numeric fields from `REMOTE_PROBE_*` environment variables.
    ///
    /// Recognized: `CONNECT_TIMEOUT_SECS`, `COMMAND_TIMEOUT_SECS`,
    /// `POLL_INTERVAL_SECS`, `POLL_TIMEOUT_SECS`, `DRAIN_CHUNK` (each with
    /// the `REMOTE_PROBE_` prefix).
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        override_u64(&mut self.connect_timeout_secs, "CONNECT_TIMEOUT_SECS")?;
        override_u64(&mut self.command_timeout_secs, "COMMAND_TIMEOUT_SECS")?;
        override_u64(&mut self.poll_interval_secs, "POLL_INTERVAL_SECS")?;
        override_u64(&mut self.poll_timeout_secs, "POLL_TIMEOUT_SECS")?;

        let mut chunk = self.drain_chunk as u64;
        override_u64(&mut chunk, "DRAIN_CHUNK")?;
        self.drain_chunk = chunk as usize;

        Ok(())
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout_secs == 0 {
            return Err(ProbeError::config("connect_timeout_secs must be positive"));
        }
        if self.command_timeout_secs == 0 {
            return Err(ProbeError::config("command_timeout_secs must be positive"));
        }
        if self.poll_interval_secs == 0 {
            return Err(ProbeError::config("poll_interval_secs must be positive"));
        }
        if self.poll_interval_secs > self.poll_timeout_secs {
            return Err(ProbeError::config(
                "poll_interval_secs exceeds poll_timeout_secs",
            ));
        }
        if self.drain_chunk == 0 {
            return Err(ProbeError::config("drain_chunk must be positive"));
        }
        for host in &self.hosts {
            if host.name.is_empty() || host.address.is_empty() || host.user.is_empty() {
                return Err(ProbeError::config(format!(
                    "host entry '{}' has an empty field",
                    host.name
                )));
            }
        }
        Ok(())
    }

    /// Look a host up by name.
    #[must_use]
    pub fn host(&self, name: &str) -> Option<&HostEntry> {
        self.hosts.iter().find(|h| h.name == name)
    }

    /// Connect timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Per-command timeout.
    #[must_use]
    pub const fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Sleep between polling ticks.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Bound on a polled wait.
    #[must_use]
    pub const fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

#[cfg(feature = "ssh")]
impl HostEntry {
    /// Build an SSH config for this host, taking timeouts and chunk size
    /// from `config`. Credentials default to agent-then-key lookup for the
    /// configured user.
    #[must_use]
    pub fn ssh_config(&self, config: &ProbeConfig) -> crate::backend::ssh::SshConfig {
        use crate::backend::ssh::Credentials;

        crate::backend::ssh::SshConfig::new(&self.address)
            .port(self.port)
            .credentials(Credentials::new(&self.user).with_defaults())
            .connect_timeout(config.connect_timeout())
            .drain_chunk(config.drain_chunk)
    }
}

fn override_u64(slot: &mut u64, name: &str) -> Result<()> {
    let var = format!("{ENV_PREFIX}{name}");
    if let Ok(value) = std::env::var(&var) {
        *slot = value
            .parse()
            .map_err(|_| ProbeError::config(format!("{var} is not a number: '{value}'")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ProbeConfig::default().validate().unwrap();
    }

    #[test]
    fn parses_toml() {
        let config = ProbeConfig::from_toml(
            r#"
            connect_timeout_secs = 10
            poll_interval_secs = 2
            poll_timeout_secs = 60

            [[hosts]]
            name = "mon0"
            address = "mon0.lab"
            user = "qa"
            "#,
        )
        .unwrap();

        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        let host = config.host("mon0").unwrap();
        assert_eq!(host.address, "mon0.lab");
        assert_eq!(host.port, 22);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(ProbeConfig::from_toml("unknown_key = 1").is_err());
    }

    #[test]
    fn rejects_zero_interval() {
        let mut config = ProbeConfig::default();
        config.poll_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_interval_above_timeout() {
        let mut config = ProbeConfig::default();
        config.poll_interval_secs = 120;
        config.poll_timeout_secs = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_host_fields() {
        let config = ProbeConfig::from_toml(
            r#"
            [[hosts]]
            name = "mon0"
            address = ""
            user = "qa"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_host_lookup() {
        assert!(ProbeConfig::default().host("nope").is_none());
    }

    #[cfg(feature = "ssh")]
    #[test]
    fn host_entry_builds_ssh_config() {
        let config = ProbeConfig::from_toml(
            r#"
            connect_timeout_secs = 12
            drain_chunk = 2048

            [[hosts]]
            name = "osd3"
            address = "10.8.1.13"
            port = 2222
            user = "qa"
            "#,
        )
        .unwrap();

        let ssh = config.host("osd3").unwrap().ssh_config(&config);
        assert_eq!(ssh.host, "10.8.1.13");
        assert_eq!(ssh.port, 2222);
        assert_eq!(ssh.credentials.username, "qa");
        assert_eq!(ssh.connect_timeout, Duration::from_secs(12));
        assert_eq!(ssh.drain_chunk, 2048);
    }
}
