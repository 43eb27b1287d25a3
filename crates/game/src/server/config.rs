use glam::Vec3;

use crate::net::DEFAULT_REJOIN_MALUS;

pub const DEFAULT_RETRY_INTERVAL: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("retry interval must be greater than zero")]
    ZeroRetryInterval,
    #[error("rejoin malus must be greater than zero")]
    ZeroRejoinMalus,
    #[error("datagram batch limit must be greater than zero")]
    ZeroBatchLimit,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub retry_interval: u64,
    pub rejoin_malus: u32,
    pub spawn_position: Vec3,
    pub broadcast_state: bool,
    pub max_datagrams_per_tick: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            rejoin_malus: DEFAULT_REJOIN_MALUS,
            spawn_position: Vec3::ZERO,
            broadcast_state: true,
            max_datagrams_per_tick: None,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_interval == 0 {
            return Err(ConfigError::ZeroRetryInterval);
        }
        if self.rejoin_malus == 0 {
            return Err(ConfigError::ZeroRejoinMalus);
        }
        if self.max_datagrams_per_tick == Some(0) {
            return Err(ConfigError::ZeroBatchLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(ServerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_zero_values() {
        let config = ServerConfig {
            retry_interval: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroRetryInterval));

        let config = ServerConfig {
            rejoin_malus: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroRejoinMalus));

        let config = ServerConfig {
            max_datagrams_per_tick: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBatchLimit));
    }
}
