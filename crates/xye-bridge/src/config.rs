//! Bridge configuration.
//!
//! Settings come from three layers: built-in defaults, an optional YAML file,
//! and command-line flags. Every field has a default, so a config file only
//! needs the values it changes:
//!
//! ```yaml
//! serial:
//!   port: /dev/ttyUSB0
//! udp:
//!   host: 255.255.255.255
//!   broadcast: true
//! ```

use std::path::Path;

use serde::Deserialize;
use xye_protocol::{
    PacketHeader, BUS_TYPE_XYE, DEFAULT_BAUD_RATE, DEFAULT_UDP_HOST, DEFAULT_UDP_PORT,
    MANUFACTURER_MIDEA, MAX_FRAME_LEN,
};

use crate::error::{BridgeError, BridgeResult};

// ============================================================================
// Types
// ============================================================================

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerialConfig {
    /// Port identifier (`COM3`, `/dev/ttyUSB0`).
    pub port: Option<String>,
    /// Baud rate.
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

/// Datagram destination settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UdpConfig {
    /// Destination host name or address.
    pub host: String,
    /// Destination port.
    pub port: u16,
    /// Allow sending to broadcast addresses.
    pub broadcast: bool,
}

impl Default for UdpConfig {
    fn default() -> Self {
        UdpConfig {
            host: DEFAULT_UDP_HOST.to_string(),
            port: DEFAULT_UDP_PORT,
            broadcast: false,
        }
    }
}

/// Packet header codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderConfig {
    /// Manufacturer code.
    pub manufacturer: u8,
    /// Bus type code.
    pub bus_type: u8,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        HeaderConfig {
            manufacturer: MANUFACTURER_MIDEA,
            bus_type: BUS_TYPE_XYE,
        }
    }
}

impl From<HeaderConfig> for PacketHeader {
    fn from(config: HeaderConfig) -> Self {
        PacketHeader::new(config.manufacturer, config.bus_type)
    }
}

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Serial link.
    pub serial: SerialConfig,
    /// Datagram destination.
    pub udp: UdpConfig,
    /// Packet header codes.
    pub header: HeaderConfig,
    /// Maximum frame buffer length.
    pub max_frame_len: usize,
    /// Depth of the send queue. `None` sends on the reading thread.
    pub queue_depth: Option<usize>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            serial: SerialConfig::default(),
            udp: UdpConfig::default(),
            header: HeaderConfig::default(),
            max_frame_len: MAX_FRAME_LEN,
            queue_depth: None,
        }
    }
}

impl BridgeConfig {
    /// Check values that serde cannot.
    pub fn validate(&self) -> BridgeResult<()> {
        if self.max_frame_len < 2 {
            return Err(BridgeError::InvalidConfig(format!(
                "max_frame_len must be at least 2, got {}",
                self.max_frame_len
            )));
        }
        if self.queue_depth == Some(0) {
            return Err(BridgeError::InvalidConfig(
                "queue_depth must be at least 1".to_string(),
            ));
        }
        if self.serial.baud_rate == 0 {
            return Err(BridgeError::InvalidConfig(
                "baud_rate must be nonzero".to_string(),
            ));
        }
        Ok(())
    }

    /// Serial port name, or an error when none was configured.
    pub fn port_name(&self) -> BridgeResult<&str> {
        self.serial.port.as_deref().ok_or(BridgeError::MissingPort)
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Parse a configuration from YAML text.
pub fn load_config_from_str(yaml: &str) -> BridgeResult<BridgeConfig> {
    // An empty document means "all defaults".
    if yaml.trim().is_empty() {
        return Ok(BridgeConfig::default());
    }
    let config: BridgeConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

/// Load a configuration from a YAML file.
pub fn load_config(path: &Path) -> BridgeResult<BridgeConfig> {
    let text = std::fs::read_to_string(path)?;
    load_config_from_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.serial.port, None);
        assert_eq!(config.serial.baud_rate, 4800);
        assert_eq!(config.udp.host, "127.0.0.1");
        assert_eq!(config.udp.port, 22222);
        assert!(!config.udp.broadcast);
        assert_eq!(config.header, HeaderConfig { manufacturer: 1, bus_type: 0 });
        assert_eq!(config.max_frame_len, 128);
        assert_eq!(config.queue_depth, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = load_config_from_str(
            r#"
serial:
  port: /dev/ttyUSB0
udp:
  host: 255.255.255.255
  broadcast: true
"#,
        )
        .expect("should parse");

        assert_eq!(config.serial.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.serial.baud_rate, 4800);
        assert_eq!(config.udp.host, "255.255.255.255");
        assert_eq!(config.udp.port, 22222);
        assert!(config.udp.broadcast);
    }

    #[test]
    fn test_full_yaml() {
        let config = load_config_from_str(
            r#"
serial:
  port: COM3
  baud_rate: 9600
udp:
  host: 10.0.0.5
  port: 30000
header:
  manufacturer: 2
  bus_type: 1
max_frame_len: 64
queue_depth: 16
"#,
        )
        .expect("should parse");

        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.udp.port, 30000);
        assert_eq!(PacketHeader::from(config.header), PacketHeader::new(2, 1));
        assert_eq!(config.max_frame_len, 64);
        assert_eq!(config.queue_depth, Some(16));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(load_config_from_str("").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = load_config_from_str("udp:\n  hots: example\n").unwrap_err();
        assert!(matches!(err, BridgeError::ConfigParse(_)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            load_config_from_str("max_frame_len: 1\n"),
            Err(BridgeError::InvalidConfig(_))
        ));
        assert!(matches!(
            load_config_from_str("queue_depth: 0\n"),
            Err(BridgeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_port() {
        assert!(matches!(
            BridgeConfig::default().port_name(),
            Err(BridgeError::MissingPort)
        ));
    }
}
