//! Datagram forwarding.

use std::io;

use crate::packet::PacketHeader;

/// Anything that can send one datagram.
///
/// A sink sends each packet whole or fails; it never fragments or retries.
pub trait DatagramSink {
    /// Send `packet` as a single datagram.
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()>;
}

/// Recording sink, mostly for tests.
impl DatagramSink for Vec<Vec<u8>> {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()> {
        self.push(packet.to_vec());
        Ok(())
    }
}

impl<S: DatagramSink + ?Sized> DatagramSink for &mut S {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()> {
        (**self).send_datagram(packet)
    }
}

impl<S: DatagramSink + ?Sized> DatagramSink for Box<S> {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()> {
        (**self).send_datagram(packet)
    }
}

/// Wraps frames in the packet header and hands them to a sink.
#[derive(Debug)]
pub struct Forwarder<S> {
    header: PacketHeader,
    sink: S,
}

impl<S: DatagramSink> Forwarder<S> {
    /// Create a forwarder with the given header codes.
    pub fn new(header: PacketHeader, sink: S) -> Self {
        Forwarder { header, sink }
    }

    /// Header used for every packet.
    pub fn header(&self) -> PacketHeader {
        self.header
    }

    /// Get a reference to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get a mutable reference to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the forwarder and return the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Send one frame as one datagram.
    ///
    /// Exactly one send is attempted. Returns the packet length on success.
    pub fn forward(&mut self, frame: &[u8]) -> io::Result<usize> {
        let packet = self.header.encode(frame);
        self.sink.send_datagram(&packet)?;
        Ok(packet.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HEADER_LEN;
    use crate::FrameAssembler;

    struct FailingSink {
        attempts: usize,
    }

    impl DatagramSink for FailingSink {
        fn send_datagram(&mut self, _packet: &[u8]) -> io::Result<()> {
            self.attempts += 1;
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable"))
        }
    }

    #[test]
    fn test_forward_records_packet() {
        let mut forwarder = Forwarder::new(PacketHeader::default(), Vec::new());
        let sent = forwarder.forward(&[0xAA, 0x01, 0x55]).unwrap();

        assert_eq!(sent, HEADER_LEN + 3);
        let packets = forwarder.into_sink();
        assert_eq!(packets.len(), 1);
        assert_eq!(&packets[0][..10], b"HVAC_shark");
        assert_eq!(&packets[0][HEADER_LEN..], &[0xAA, 0x01, 0x55]);
    }

    #[test]
    fn test_forward_failure_is_single_attempt() {
        let mut forwarder = Forwarder::new(PacketHeader::default(), FailingSink { attempts: 0 });
        let err = forwarder.forward(&[0xAA, 0x55]).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(forwarder.sink().attempts, 1);
    }

    #[test]
    fn test_failed_send_does_not_affect_assembly() {
        let mut asm = FrameAssembler::new();
        let mut forwarder = Forwarder::new(PacketHeader::default(), FailingSink { attempts: 0 });

        for frame in asm.push(&[0xAA, 0x01, 0xAA, 0x02]) {
            assert!(forwarder.forward(&frame.bytes).is_err());
        }
        assert_eq!(asm.buffered(), &[0xAA, 0x02]);
        assert_eq!(forwarder.sink().attempts, 1);
    }

    #[test]
    fn test_forward_through_mutable_reference() {
        let mut packets: Vec<Vec<u8>> = Vec::new();
        {
            let mut forwarder = Forwarder::new(PacketHeader::new(1, 0), &mut packets);
            forwarder.forward(&[0xAA, 0x55]).unwrap();
            forwarder.forward(&[0xAA, 0x10, 0x55]).unwrap();
        }
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[1].len(), HEADER_LEN + 3);
    }
}
