//! UDP datagram sink.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

use tracing::debug;
use xye_protocol::DatagramSink;

use crate::config::UdpConfig;
use crate::error::{BridgeError, BridgeResult};

/// Sends each packet as one datagram to a fixed destination.
#[derive(Debug)]
pub struct UdpSink {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl UdpSink {
    /// Resolve the destination once and bind an ephemeral local socket.
    pub fn connect(config: &UdpConfig) -> BridgeResult<Self> {
        let dest = resolve(&config.host, config.port)?;
        let local: SocketAddr = match dest {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local)?;
        if config.broadcast {
            socket.set_broadcast(true)?;
        }
        debug!("UDP socket {} -> {}", socket.local_addr()?, dest);
        Ok(UdpSink { socket, dest })
    }

    /// Destination address.
    pub fn dest(&self) -> SocketAddr {
        self.dest
    }
}

impl DatagramSink for UdpSink {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()> {
        let sent = self.socket.send_to(packet, self.dest)?;
        if sent != packet.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("datagram truncated: sent {} of {} bytes", sent, packet.len()),
            ));
        }
        Ok(())
    }
}

/// Resolve `host:port` to its first address.
pub fn resolve(host: &str, port: u16) -> BridgeResult<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| BridgeError::Unresolved {
            host: host.to_string(),
            port,
        })
}
