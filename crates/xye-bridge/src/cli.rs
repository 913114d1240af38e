//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, BridgeConfig};
use crate::error::BridgeResult;

/// Midea XYE RS485 to UDP bridge.
#[derive(Debug, Parser)]
#[command(name = "xye-bridge", version, about = "Midea XYE RS485 to UDP bridge")]
pub struct Args {
    /// Serial port (e.g., COM3 or /dev/ttyUSB0).
    #[arg(long)]
    pub port: Option<String>,

    /// Baud rate [default: 4800].
    #[arg(long)]
    pub baud: Option<u32>,

    /// UDP target host [default: 127.0.0.1].
    #[arg(long)]
    pub udp_host: Option<String>,

    /// UDP target port [default: 22222].
    #[arg(long)]
    pub udp_port: Option<u16>,

    /// Allow sending to a broadcast address.
    #[arg(long)]
    pub broadcast: bool,

    /// Manufacturer code written into the packet header [default: 1].
    #[arg(long)]
    pub manufacturer: Option<u8>,

    /// Bus type code written into the packet header [default: 0].
    #[arg(long)]
    pub bus_type: Option<u8>,

    /// Send datagrams from a separate thread through a queue of this depth.
    #[arg(long)]
    pub queue_depth: Option<usize>,

    /// YAML config file. Flags override values from the file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List available serial ports and exit.
    #[arg(long)]
    pub list_ports: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Build the effective configuration: defaults, then file, then flags.
    pub fn resolve_config(&self) -> BridgeResult<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => BridgeConfig::default(),
        };
        self.apply_overrides(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut BridgeConfig) {
        if let Some(port) = &self.port {
            config.serial.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.serial.baud_rate = baud;
        }
        if let Some(host) = &self.udp_host {
            config.udp.host = host.clone();
        }
        if let Some(port) = self.udp_port {
            config.udp.port = port;
        }
        if self.broadcast {
            config.udp.broadcast = true;
        }
        if let Some(manufacturer) = self.manufacturer {
            config.header.manufacturer = manufacturer;
        }
        if let Some(bus_type) = self.bus_type {
            config.header.bus_type = bus_type;
        }
        if let Some(depth) = self.queue_depth {
            config.queue_depth = Some(depth);
        }
    }

    /// Default log filter derived from `-v` / `-q`.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
