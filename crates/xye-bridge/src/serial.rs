//! Serial port access.

use std::fmt;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortInfo, SerialPortType, StopBits};

use crate::config::SerialConfig;
use crate::error::BridgeResult;

/// Read timeout; a timed-out read lets the run loop check for shutdown.
pub const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// A serial port as shown by `--list-ports`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortListing {
    /// Device name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
}

impl fmt::Display for PortListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

impl From<SerialPortInfo> for PortListing {
    fn from(info: SerialPortInfo) -> Self {
        let description = match info.port_type {
            SerialPortType::UsbPort(usb) => {
                let label = [usb.manufacturer, usb.product]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                if label.is_empty() {
                    format!("USB {:04x}:{:04x}", usb.vid, usb.pid)
                } else {
                    label
                }
            }
            SerialPortType::BluetoothPort => "Bluetooth".to_string(),
            SerialPortType::PciPort => "PCI".to_string(),
            SerialPortType::Unknown => "n/a".to_string(),
        };
        PortListing {
            name: info.port_name,
            description,
        }
    }
}

/// Enumerate serial ports on this machine.
pub fn list_ports() -> BridgeResult<Vec<PortListing>> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(PortListing::from).collect())
}

/// Open the configured port as 8N1 without flow control.
pub fn open_port(config: &SerialConfig, port_name: &str) -> BridgeResult<Box<dyn SerialPort>> {
    let port = serialport::new(port_name, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(READ_TIMEOUT)
        .open()?;
    Ok(port)
}
