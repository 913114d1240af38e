//! # xye-bridge
//!
//! Forwards traffic captured on a Midea XYE RS-485 bus to the network.
//!
//! Bytes are read from a serial port, grouped into frames by
//! [`xye_protocol::FrameAssembler`], and every frame is sent as one UDP
//! datagram carrying the `HVAC_shark` header. Delivery is best effort: there
//! is no retry and no acknowledgment.
//!
//! ## Components
//!
//! - [`Bridge`]: the read loop tying a byte source to a datagram sink
//! - [`UdpSink`]: sends datagrams to the configured host and port
//! - [`QueuedSink`]: optional forwarder thread behind a bounded queue
//! - [`BridgeConfig`]: defaults, YAML file, and command-line overrides

pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod queue;
pub mod serial;
pub mod stats;
pub mod udp;

pub use bridge::{Bridge, RunOutcome};
pub use cli::Args;
pub use config::{load_config, load_config_from_str, BridgeConfig, HeaderConfig, SerialConfig, UdpConfig};
pub use error::{BridgeError, BridgeResult};
pub use queue::QueuedSink;
pub use serial::{list_ports, open_port, PortListing};
pub use stats::{BridgeStats, CountingSink, StatsSnapshot};
pub use udp::UdpSink;
