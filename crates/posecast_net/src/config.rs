//! # Session Configuration
//!
//! Every session parameter (addresses, ports, TTL, sleep intervals, the
//! participant identifier) lives here, loaded once at startup and handed
//! to the session. Nothing is read from globals after that.

use std::net::{Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, ExchangeResult};
use crate::registry::ParticipantId;
use crate::spawn::ClassMap;
use crate::{
    DEFAULT_MOTION_ADDR, DEFAULT_MULTICAST_GROUP, DEFAULT_MULTICAST_PORT, DEFAULT_MULTICAST_TTL,
    DEFAULT_PUBLISH_INTERVAL_MICROS, DEFAULT_RECEIVE_TIMEOUT_MILLIS, DEFAULT_REGISTRY_CAPACITY,
};

/// One participant-to-spawn-class mapping entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassMapping {
    /// The participant identifier this entry applies to.
    pub participant_id: f64,
    /// The spawn class tag handed to the actor spawner.
    pub class: String,
}

/// Configuration for one exchange session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// This participant's identifier, globally unique in the exchange.
    pub participant_id: f64,
    /// Unicast loopback target for the local motion feed.
    pub motion_addr: SocketAddr,
    /// Multicast group the telemetry exchange uses.
    pub multicast_group: Ipv4Addr,
    /// Multicast port the telemetry exchange uses.
    pub multicast_port: u16,
    /// Multicast TTL; keeps telemetry on the local network segment.
    pub multicast_ttl: u32,
    /// Sleep between successive sends of each feed, microseconds.
    pub publish_interval_micros: u64,
    /// Bound on the receiver's blocking read, milliseconds.
    pub receive_timeout_millis: u64,
    /// Fixed peer registry capacity.
    pub registry_capacity: usize,
    /// Explicit participant -> spawn-class entries.
    pub class_map: Vec<ClassMapping>,
    /// Spawn class used for identifiers with no explicit entry.
    pub default_class: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            participant_id: 0.0,
            motion_addr: DEFAULT_MOTION_ADDR,
            multicast_group: DEFAULT_MULTICAST_GROUP,
            multicast_port: DEFAULT_MULTICAST_PORT,
            multicast_ttl: DEFAULT_MULTICAST_TTL,
            publish_interval_micros: DEFAULT_PUBLISH_INTERVAL_MICROS,
            receive_timeout_millis: DEFAULT_RECEIVE_TIMEOUT_MILLIS,
            registry_capacity: DEFAULT_REGISTRY_CAPACITY,
            class_map: Vec::new(),
            default_class: "walker.pedestrian.0001".to_owned(),
        }
    }
}

impl SessionConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::InvalidConfig`] on parse or validation
    /// failure.
    pub fn from_toml_str(text: &str) -> ExchangeResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| ExchangeError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants a session relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::InvalidConfig`] naming the first violated
    /// constraint.
    pub fn validate(&self) -> ExchangeResult<()> {
        if !self.multicast_group.is_multicast() {
            return Err(ExchangeError::InvalidConfig(format!(
                "{} is not a multicast group address",
                self.multicast_group
            )));
        }
        if self.publish_interval_micros == 0 {
            return Err(ExchangeError::InvalidConfig(
                "publish_interval_micros must be non-zero".to_owned(),
            ));
        }
        if self.receive_timeout_millis == 0 {
            return Err(ExchangeError::InvalidConfig(
                "receive_timeout_millis must be non-zero (a zero timeout blocks forever)"
                    .to_owned(),
            ));
        }
        if self.registry_capacity == 0 {
            return Err(ExchangeError::InvalidConfig(
                "registry_capacity must be non-zero".to_owned(),
            ));
        }
        if self.default_class.is_empty() {
            return Err(ExchangeError::InvalidConfig(
                "default_class must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// This participant's identifier as the registry sees it.
    #[must_use]
    pub fn local_id(&self) -> ParticipantId {
        ParticipantId(self.participant_id)
    }

    /// Builds the spawn-class map from the configured entries.
    #[must_use]
    pub fn build_class_map(&self) -> ClassMap {
        let entries = self
            .class_map
            .iter()
            .map(|m| (ParticipantId(m.participant_id), m.class.clone()))
            .collect();
        ClassMap::new(entries, self.default_class.clone())
    }

    /// The full multicast socket address.
    #[must_use]
    pub fn multicast_addr(&self) -> SocketAddr {
        SocketAddr::from((self.multicast_group, self.multicast_port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_exchange_constants() {
        let config = SessionConfig::default();
        assert_eq!(config.motion_addr.to_string(), "127.0.0.1:5005");
        assert_eq!(config.multicast_group.to_string(), "224.1.1.1");
        assert_eq!(config.multicast_port, 5007);
        assert_eq!(config.multicast_ttl, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let text = r#"
            participant_id = 5551.0
            multicast_port = 6007
            registry_capacity = 8
            default_class = "vehicle.sedan.0002"

            [[class_map]]
            participant_id = 1.0
            class = "walker.pedestrian.0001"
        "#;

        let config = SessionConfig::from_toml_str(text).unwrap();
        assert!((config.participant_id - 5551.0).abs() < f64::EPSILON);
        assert_eq!(config.multicast_port, 6007);
        assert_eq!(config.registry_capacity, 8);
        assert_eq!(config.class_map.len(), 1);

        let map = config.build_class_map();
        assert_eq!(
            map.class_for(ParticipantId(1.0)),
            ("walker.pedestrian.0001", false)
        );
        assert_eq!(
            map.class_for(ParticipantId(3.0)),
            ("vehicle.sedan.0002", true)
        );
    }

    #[test]
    fn test_non_multicast_group_rejected() {
        let mut config = SessionConfig::default();
        config.multicast_group = "192.168.1.1".parse().unwrap();
        assert!(matches!(
            config.validate(),
            Err(ExchangeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = SessionConfig::default();
        config.publish_interval_micros = 0;
        assert!(config.validate().is_err());
    }
}
