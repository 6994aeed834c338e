//! SSH transport for remote command execution.
//!
//! This module provides SSH session management for driving commands on
//! cluster nodes:
//! - Multiple authentication methods (password, private key, agent)
//! - Bounded connection establishment with structured failures
//! - Exec channels translating the wire protocol into [`ChannelEvent`]s
//!
//! [`ChannelEvent`]: crate::backend::ChannelEvent

pub mod auth;
pub mod channel;
pub mod session;

// Re-export commonly used types
pub use auth::{AuthMethod, Credentials, HostVerification};
pub use channel::ExecChannel;
pub use session::{SshConfig, SshSession, SshSessionState};

/// Split a `[user@]host[:port]` target string.
///
/// Missing parts fall back to `None` for the user and 22 for the port; a
/// trailing `:segment` that does not parse as a port is kept as part of the
/// host.
#[must_use]
pub fn parse_target(target: &str) -> (Option<String>, String, u16) {
    let (user, rest) = match target.split_once('@') {
        Some((user, rest)) => (Some(user.to_string()), rest),
        None => (None, target),
    };

    let (host, port) = if let Some((host, port_str)) = rest.rsplit_once(':') {
        match port_str.parse() {
            Ok(port) => (host.to_string(), port),
            Err(_) => (rest.to_string(), 22),
        }
    } else {
        (rest.to_string(), 22)
    };

    (user, host, port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_target_full() {
        let (user, host, port) = parse_target("admin@osd3.lab:2222");
        assert_eq!(user, Some("admin".to_string()));
        assert_eq!(host, "osd3.lab");
        assert_eq!(port, 2222);
    }

    #[test]
    fn parse_target_host_only() {
        let (user, host, port) = parse_target("osd3.lab");
        assert_eq!(user, None);
        assert_eq!(host, "osd3.lab");
        assert_eq!(port, 22);
    }

    #[test]
    fn parse_target_bad_port_kept_in_host() {
        let (_, host, port) = parse_target("mon0:notaport");
        assert_eq!(host, "mon0:notaport");
        assert_eq!(port, 22);
    }
}
