// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Client configuration: daemon address, request key and per-protocol timeouts.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use ntpctl_proto::auth::{Authenticator, MAX_KEY_LEN};
use ntpctl_proto::protocol::PORT;

use crate::error::ConfigError;

/// Address of the local daemon.
pub const DEFAULT_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), PORT);

/// Whole-query timeout for mode 6 requests.
pub const MODE6_TIMEOUT: Duration = Duration::from_secs(1);

/// Whole-query timeout for mode 7 requests.
pub const MODE7_TIMEOUT: Duration = Duration::from_millis(300);

/// A symmetric key shared with the daemon (`keys` file entry plus
/// `controlkey`/`requestkey`).
#[derive(Clone, Eq, PartialEq)]
pub struct NtpKey {
    /// Key id. Zero is reserved.
    pub id: u32,
    /// Key value, at most 32 bytes.
    pub value: String,
}

impl fmt::Debug for NtpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NtpKey")
            .field("id", &self.id)
            .field("value", &"<redacted>")
            .finish()
    }
}

impl NtpKey {
    /// Create a key, validating it.
    pub fn new(id: u32, value: impl Into<String>) -> Result<Self, ConfigError> {
        let key = NtpKey {
            id,
            value: value.into(),
        };
        key.validate()?;
        Ok(key)
    }

    /// Check the key id and value against what the daemon accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id == 0 {
            return Err(ConfigError::ZeroKeyId);
        }
        if self.value.is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        if self.value.len() > MAX_KEY_LEN {
            return Err(ConfigError::KeyTooLong {
                len: self.value.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn authenticator(&self) -> Result<Authenticator, ConfigError> {
        self.validate()?;
        Authenticator::new(self.id, self.value.as_bytes()).map_err(|_| ConfigError::EmptyKey)
    }
}

impl FromStr for NtpKey {
    type Err = ConfigError;

    /// Parse `"ID VALUE"`, e.g. `"1 secret"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(id), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ConfigError::InvalidKeySpec {
                detail: "expected \"ID VALUE\"".to_string(),
            });
        };
        let id = id.parse().map_err(|_| ConfigError::InvalidKeySpec {
            detail: format!("key id {id:?} is not a number"),
        })?;
        NtpKey::new(id, value)
    }
}

/// Settings shared by both protocol instances.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    /// Daemon address.
    pub address: SocketAddr,
    /// Key for state-changing requests. Without one, clock control is refused.
    pub key: Option<NtpKey>,
    /// Whole-query timeout for mode 6, extended by each accepted fragment.
    pub mode6_timeout: Duration,
    /// Whole-query timeout for mode 7.
    pub mode7_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            address: DEFAULT_ADDRESS,
            key: None,
            mode6_timeout: MODE6_TIMEOUT,
            mode7_timeout: MODE7_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Reject settings no query could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(key) = &self.key {
            key.validate()?;
        }
        if self.mode6_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout { protocol: "mode 6" });
        }
        if self.mode7_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout { protocol: "mode 7" });
        }
        Ok(())
    }

    pub(crate) fn authenticator(&self) -> Result<Option<Authenticator>, ConfigError> {
        self.key.as_ref().map(NtpKey::authenticator).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.address, "127.0.0.1:123".parse().unwrap());
        assert_eq!(config.key, None);
        assert_eq!(config.mode6_timeout, Duration::from_secs(1));
        assert_eq!(config.mode7_timeout, Duration::from_millis(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn key_validation() {
        assert_eq!(NtpKey::new(0, "secret"), Err(ConfigError::ZeroKeyId));
        assert_eq!(NtpKey::new(1, ""), Err(ConfigError::EmptyKey));
        assert_eq!(
            NtpKey::new(1, "k".repeat(33)),
            Err(ConfigError::KeyTooLong { len: 33 })
        );
        assert!(NtpKey::new(1, "k".repeat(32)).is_ok());
    }

    #[test]
    fn key_from_str() {
        let key: NtpKey = "7 hunter2".parse().unwrap();
        assert_eq!(key.id, 7);
        assert_eq!(key.value, "hunter2");

        let key: NtpKey = "  12\tpass  ".parse().unwrap();
        assert_eq!(key.id, 12);

        assert!(matches!(
            "7".parse::<NtpKey>(),
            Err(ConfigError::InvalidKeySpec { .. })
        ));
        assert!(matches!(
            "seven secret".parse::<NtpKey>(),
            Err(ConfigError::InvalidKeySpec { .. })
        ));
        assert!(matches!(
            "1 two words".parse::<NtpKey>(),
            Err(ConfigError::InvalidKeySpec { .. })
        ));
        assert_eq!("0 secret".parse::<NtpKey>(), Err(ConfigError::ZeroKeyId));
    }

    #[test]
    fn key_debug_redacts_value() {
        let key = NtpKey::new(3, "topsecret").unwrap();
        let text = format!("{key:?}");
        assert!(text.contains("id: 3"));
        assert!(!text.contains("topsecret"));
    }

    #[test]
    fn config_rejects_bad_key_and_zero_timeouts() {
        let config = ClientConfig {
            key: Some(NtpKey {
                id: 0,
                value: "x".into(),
            }),
            ..ClientConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroKeyId));

        let config = ClientConfig {
            mode7_timeout: Duration::ZERO,
            ..ClientConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTimeout { protocol: "mode 7" })
        );
    }

    #[test]
    fn authenticator_follows_key() {
        let config = ClientConfig::default();
        assert!(config.authenticator().unwrap().is_none());

        let config = ClientConfig {
            key: Some(NtpKey::new(9, "abc").unwrap()),
            ..ClientConfig::default()
        };
        assert_eq!(config.authenticator().unwrap().unwrap().key_id(), 9);
    }
}
