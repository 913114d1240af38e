//! Protocol constants.

// ============================================================================
// Bus framing
// ============================================================================

/// Start-of-frame sentinel sent by the bus master.
pub const START: u8 = 0xAA;

/// End-of-frame sentinel.
pub const END: u8 = 0x55;

/// Maximum frame buffer length.
pub const MAX_FRAME_LEN: usize = 128;

// ============================================================================
// Forwarded packet header
// ============================================================================

/// ASCII tag opening every forwarded datagram (no terminator).
pub const PACKET_MAGIC: &[u8; 10] = b"HVAC_shark";

/// Total header length: magic, manufacturer, bus type, reserved.
pub const HEADER_LEN: usize = PACKET_MAGIC.len() + 3;

/// Manufacturer code for Midea.
pub const MANUFACTURER_MIDEA: u8 = 1;

/// Bus type code for the XYE bus.
pub const BUS_TYPE_XYE: u8 = 0;

/// Value of the reserved header byte.
pub const HEADER_RESERVED: u8 = 0;

// ============================================================================
// Link defaults
// ============================================================================

/// Default XYE bus baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 4800;

/// Default datagram destination host.
pub const DEFAULT_UDP_HOST: &str = "127.0.0.1";

/// Default datagram destination port.
pub const DEFAULT_UDP_PORT: u16 = 22222;
