//! Queued datagram sending.
//!
//! Moves network sends off the reading thread. Packets travel through a
//! bounded channel to a single forwarder thread, so they leave in the order
//! they were queued. A full queue drops the new packet instead of blocking
//! the serial reader.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, warn};
use xye_protocol::DatagramSink;

use crate::stats::BridgeStats;

/// Sink that hands packets to a forwarder thread.
pub struct QueuedSink {
    tx: Option<Sender<Vec<u8>>>,
    thread: Option<JoinHandle<()>>,
    stats: Arc<BridgeStats>,
}

impl QueuedSink {
    /// Spawn the forwarder thread owning `sink`.
    pub fn spawn<S>(sink: S, depth: usize, stats: Arc<BridgeStats>) -> io::Result<Self>
    where
        S: DatagramSink + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded::<Vec<u8>>(depth.max(1));

        let thread = thread::Builder::new()
            .name("xye-forwarder".to_string())
            .spawn(move || {
                let mut sink = sink;
                // Runs until every sender is gone and the queue is drained.
                for packet in rx.iter() {
                    if let Err(e) = sink.send_datagram(&packet) {
                        warn!("Failed to send datagram ({} bytes): {}", packet.len(), e);
                    }
                }
                debug!("forwarder thread exiting");
            })?;

        Ok(QueuedSink {
            tx: Some(tx),
            thread: Some(thread),
            stats,
        })
    }

    /// Number of packets waiting to be sent.
    pub fn pending(&self) -> usize {
        self.tx.as_ref().map_or(0, |tx| tx.len())
    }

    /// Close the queue, wait for queued packets to be sent and the thread to exit.
    pub fn finish(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("forwarder thread panicked");
            }
        }
    }
}

impl DatagramSink for QueuedSink {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()> {
        let Some(tx) = &self.tx else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "send queue closed"));
        };
        match tx.try_send(packet.to_vec()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.stats.record_queue_drop();
                Err(io::Error::new(io::ErrorKind::WouldBlock, "send queue full"))
            }
            Err(TrySendError::Disconnected(_)) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "forwarder thread stopped",
            )),
        }
    }
}

impl Drop for QueuedSink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{Receiver, Sender as ChannelSender};
    use std::sync::Mutex;

    struct SharedSink(Arc<Mutex<Vec<Vec<u8>>>>);

    impl DatagramSink for SharedSink {
        fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()> {
            self.0.lock().unwrap().push(packet.to_vec());
            Ok(())
        }
    }

    /// Blocks each send until the test releases it.
    struct GatedSink {
        gate: Receiver<()>,
        sent: ChannelSender<Vec<u8>>,
    }

    impl DatagramSink for GatedSink {
        fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()> {
            let _ = self.gate.recv();
            let _ = self.sent.send(packet.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_queue_preserves_order() {
        let packets = Arc::new(Mutex::new(Vec::new()));
        let stats = Arc::new(BridgeStats::new());
        let mut queue = QueuedSink::spawn(SharedSink(packets.clone()), 1024, stats).unwrap();

        for i in 0..200u8 {
            queue.send_datagram(&[i]).unwrap();
        }
        queue.finish();

        let packets = packets.lock().unwrap();
        assert_eq!(packets.len(), 200);
        for (i, packet) in packets.iter().enumerate() {
            assert_eq!(packet, &vec![i as u8]);
        }
    }

    #[test]
    fn test_full_queue_drops_packet() {
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let (sent_tx, sent_rx) = crossbeam_channel::unbounded();
        let stats = Arc::new(BridgeStats::new());
        let mut queue = QueuedSink::spawn(
            GatedSink {
                gate: gate_rx,
                sent: sent_tx,
            },
            1,
            stats.clone(),
        )
        .unwrap();

        // First packet is taken by the thread and blocks on the gate.
        queue.send_datagram(&[1]).unwrap();
        while queue.pending() > 0 {
            thread::yield_now();
        }
        // Second fills the queue, third is dropped.
        queue.send_datagram(&[2]).unwrap();
        let err = queue.send_datagram(&[3]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        assert_eq!(stats.snapshot().queue_drops, 1);

        gate_tx.send(()).unwrap();
        gate_tx.send(()).unwrap();
        drop(gate_tx);
        queue.finish();

        let sent: Vec<Vec<u8>> = sent_rx.try_iter().collect();
        assert_eq!(sent, vec![vec![1], vec![2]]);
    }
}
