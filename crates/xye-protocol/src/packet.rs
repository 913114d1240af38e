//! Forwarded packet encapsulation.
//!
//! Every frame leaves the bridge as one UDP datagram with a fixed 13-byte
//! header:
//!
//! ```text
//! +--------------+--------------+----------+----------+----------------+
//! | "HVAC_shark" | manufacturer | bus type | reserved | frame[0..n]    |
//! |   10 bytes   |    1 byte    |  1 byte  |  1 byte  |                |
//! +--------------+--------------+----------+----------+----------------+
//! ```

use bytes::{BufMut, Bytes};

use crate::constants::{
    BUS_TYPE_XYE, HEADER_LEN, HEADER_RESERVED, MANUFACTURER_MIDEA, PACKET_MAGIC,
};
use crate::error::{ProtocolError, ProtocolResult};

/// Configurable part of the forwarded packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Manufacturer code (`1` = Midea).
    pub manufacturer: u8,
    /// Bus type code (`0` = XYE).
    pub bus_type: u8,
}

impl Default for PacketHeader {
    fn default() -> Self {
        PacketHeader {
            manufacturer: MANUFACTURER_MIDEA,
            bus_type: BUS_TYPE_XYE,
        }
    }
}

impl PacketHeader {
    /// Create a header with the given codes.
    pub fn new(manufacturer: u8, bus_type: u8) -> Self {
        PacketHeader {
            manufacturer,
            bus_type,
        }
    }

    /// The 13 header bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[..PACKET_MAGIC.len()].copy_from_slice(PACKET_MAGIC);
        header[10] = self.manufacturer;
        header[11] = self.bus_type;
        header[12] = HEADER_RESERVED;
        header
    }

    /// Build a datagram: header followed by the frame bytes.
    pub fn encode(&self, frame: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + frame.len());
        buf.put_slice(&self.to_bytes());
        buf.put_slice(frame);
        buf
    }
}

/// A datagram received from a bridge, split into header and frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedPacket {
    /// Header codes.
    pub header: PacketHeader,
    /// Raw frame bytes.
    pub frame: Bytes,
}

impl ForwardedPacket {
    /// Parse a datagram produced by [`PacketHeader::encode`].
    ///
    /// The frame part must hold at least one byte.
    pub fn parse(data: &[u8]) -> ProtocolResult<Self> {
        if data.len() < HEADER_LEN + 1 {
            return Err(ProtocolError::PacketTooShort {
                expected: HEADER_LEN + 1,
                actual: data.len(),
            });
        }
        if &data[..PACKET_MAGIC.len()] != PACKET_MAGIC {
            return Err(ProtocolError::BadMagic);
        }
        if data[12] != HEADER_RESERVED {
            return Err(ProtocolError::NonZeroReserved(data[12]));
        }

        Ok(ForwardedPacket {
            header: PacketHeader::new(data[10], data[11]),
            frame: Bytes::copy_from_slice(&data[HEADER_LEN..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = PacketHeader::default().to_bytes();
        assert_eq!(
            header,
            [b'H', b'V', b'A', b'C', b'_', b's', b'h', b'a', b'r', b'k', 1, 0, 0]
        );
    }

    #[test]
    fn test_encode_prepends_header() {
        let frame = [0xAA, 0xC0, 0x00, 0x55];
        let packet = PacketHeader::default().encode(&frame);

        assert_eq!(packet.len(), HEADER_LEN + frame.len());
        assert_eq!(&packet[..10], b"HVAC_shark");
        assert_eq!(packet[10], MANUFACTURER_MIDEA);
        assert_eq!(packet[11], BUS_TYPE_XYE);
        assert_eq!(packet[12], 0);
        assert_eq!(&packet[13..], &frame);
    }

    #[test]
    fn test_custom_codes() {
        let packet = PacketHeader::new(7, 3).encode(&[0xAA]);
        assert_eq!(packet[10], 7);
        assert_eq!(packet[11], 3);
        assert_eq!(packet[12], 0);
    }

    #[test]
    fn test_parse_packet() {
        let packet = PacketHeader::new(1, 0).encode(&[0xAA, 0x01, 0x55]);
        let parsed = ForwardedPacket::parse(&packet).expect("should parse");

        assert_eq!(parsed.header, PacketHeader::default());
        assert_eq!(&parsed.frame[..], &[0xAA, 0x01, 0x55]);
    }

    #[test]
    fn test_parse_too_short() {
        let header = PacketHeader::default().to_bytes();
        assert_eq!(
            ForwardedPacket::parse(&header),
            Err(ProtocolError::PacketTooShort {
                expected: 14,
                actual: 13
            })
        );
    }

    #[test]
    fn test_parse_bad_magic() {
        let mut packet = PacketHeader::default().encode(&[0xAA]);
        packet[0] = b'h';
        assert_eq!(ForwardedPacket::parse(&packet), Err(ProtocolError::BadMagic));
    }

    #[test]
    fn test_parse_reserved_byte() {
        let mut packet = PacketHeader::default().encode(&[0xAA]);
        packet[12] = 0x01;
        assert_eq!(
            ForwardedPacket::parse(&packet),
            Err(ProtocolError::NonZeroReserved(0x01))
        );
    }
}
