//! Server configuration.
//!
//! Defaults suit local play; every field can be overridden from the
//! environment with [`ServerConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

use neologisms_room::RoomConfig;

use crate::NeologismsError;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5021";

/// Default listen address of the HTTP routes.
pub const DEFAULT_HTTP_BIND_ADDR: &str = "127.0.0.1:5020";

/// How long a new connection may take to complete the WebSocket handshake.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long a single frame may take to write before the client is dropped.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Default idle timeout for a connection that sends nothing.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// Address the HTTP routes bind to. `None` serves WebSocket only.
    pub http_bind_addr: Option<String>,
    /// Close connections that send no frame for this long. `None` keeps
    /// them open forever.
    pub idle_timeout: Option<Duration>,
    /// Drop connections that have not finished the handshake by then.
    pub handshake_timeout: Duration,
    /// Drop connections that stop reading their frames.
    pub send_timeout: Duration,
    /// Settings applied to every room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            http_bind_addr: Some(DEFAULT_HTTP_BIND_ADDR.to_owned()),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `NEOLOGISMS_BIND` -- listen address (default `127.0.0.1:5021`)
    /// - `NEOLOGISMS_HTTP_BIND` -- HTTP listen address, empty disables
    ///   (default `127.0.0.1:5020`)
    /// - `NEOLOGISMS_IDLE_TIMEOUT_SECS` -- idle timeout, 0 disables (default 600)
    /// - `NEOLOGISMS_HANDSHAKE_TIMEOUT_SECS` -- handshake deadline (default 10)
    /// - `NEOLOGISMS_SEND_TIMEOUT_SECS` -- per-frame write deadline (default 10)
    /// - `NEOLOGISMS_FINISH_WHEN_EXHAUSTED` -- end a game once the board is
    ///   cleared (default `true`)
    /// - `NEOLOGISMS_MAX_TIMER_SECS` -- longest accepted game timer (default 3600)
    pub fn from_env() -> Result<Self, NeologismsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, NeologismsError> {
        let defaults = Self::default();

        let bind_addr = lookup("NEOLOGISMS_BIND").unwrap_or(defaults.bind_addr);
        let http_bind_addr = match lookup("NEOLOGISMS_HTTP_BIND") {
            None => defaults.http_bind_addr,
            Some(addr) if addr.trim().is_empty() => None,
            Some(addr) => Some(addr),
        };

        let idle_secs: u64 = parse_var(
            &lookup,
            "NEOLOGISMS_IDLE_TIMEOUT_SECS",
            DEFAULT_IDLE_TIMEOUT.as_secs(),
        )?;
        let idle_timeout = (idle_secs > 0).then(|| Duration::from_secs(idle_secs));
        let handshake_timeout = Duration::from_secs(parse_var(
            &lookup,
            "NEOLOGISMS_HANDSHAKE_TIMEOUT_SECS",
            DEFAULT_HANDSHAKE_TIMEOUT.as_secs(),
        )?);
        let send_timeout = Duration::from_secs(parse_var(
            &lookup,
            "NEOLOGISMS_SEND_TIMEOUT_SECS",
            DEFAULT_SEND_TIMEOUT.as_secs(),
        )?);

        let finish_when_exhausted = parse_var(
            &lookup,
            "NEOLOGISMS_FINISH_WHEN_EXHAUSTED",
            defaults.room.finish_when_exhausted,
        )?;
        let max_timer_secs = parse_var(
            &lookup,
            "NEOLOGISMS_MAX_TIMER_SECS",
            defaults.room.max_timer_secs,
        )?;

        Ok(Self {
            bind_addr,
            http_bind_addr,
            idle_timeout,
            handshake_timeout,
            send_timeout,
            room: defaults
                .room
                .with_finish_when_exhausted(finish_when_exhausted)
                .with_max_timer_secs(max_timer_secs),
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, NeologismsError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| NeologismsError::Config(format!("invalid {name}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:5021");
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.http_bind_addr.as_deref(), Some("127.0.0.1:5020"));
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
        assert_eq!(config.send_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("NEOLOGISMS_BIND", "0.0.0.0:9000"),
            ("NEOLOGISMS_HTTP_BIND", ""),
            ("NEOLOGISMS_IDLE_TIMEOUT_SECS", "0"),
            ("NEOLOGISMS_HANDSHAKE_TIMEOUT_SECS", "3"),
            ("NEOLOGISMS_SEND_TIMEOUT_SECS", "4"),
            ("NEOLOGISMS_FINISH_WHEN_EXHAUSTED", "false"),
            ("NEOLOGISMS_MAX_TIMER_SECS", " 120 "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.http_bind_addr, None);
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.handshake_timeout, Duration::from_secs(3));
        assert_eq!(config.send_timeout, Duration::from_secs(4));
        assert!(!config.room.finish_when_exhausted);
        assert_eq!(config.room.max_timer_secs, 120);
    }

    #[test]
    fn test_bad_value_names_the_variable() {
        let err = ServerConfig::from_lookup(lookup(&[("NEOLOGISMS_MAX_TIMER_SECS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, NeologismsError::Config(_)));
        assert!(err.to_string().contains("NEOLOGISMS_MAX_TIMER_SECS"));
    }
}
