//! Run statistics.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::info;
use xye_protocol::{DatagramSink, EmitReason};

/// Counters updated while the bridge runs.
///
/// Shared between the reading thread and the forwarder thread.
#[derive(Debug, Default)]
pub struct BridgeStats {
    bytes_read: AtomicU64,
    bytes_ignored: AtomicU64,
    frames_terminated: AtomicU64,
    frames_interrupted: AtomicU64,
    frames_overflow: AtomicU64,
    datagrams_sent: AtomicU64,
    send_failures: AtomicU64,
    queue_drops: AtomicU64,
}

/// Point-in-time copy of [`BridgeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Bytes received from the byte source.
    pub bytes_read: u64,
    /// Bytes dropped while no frame was open.
    pub bytes_ignored: u64,
    /// Frames closed by an end byte.
    pub frames_terminated: u64,
    /// Frames cut by a new start byte.
    pub frames_interrupted: u64,
    /// Frames cut at the maximum length.
    pub frames_overflow: u64,
    /// Datagrams handed to the network.
    pub datagrams_sent: u64,
    /// Datagram sends that failed.
    pub send_failures: u64,
    /// Frames dropped because the send queue was full.
    pub queue_drops: u64,
}

impl StatsSnapshot {
    /// Total frames emitted for any reason.
    pub fn frames_total(&self) -> u64 {
        self.frames_terminated + self.frames_interrupted + self.frames_overflow
    }
}

impl BridgeStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count bytes read from the source.
    pub fn record_read(&self, n: usize) {
        self.bytes_read.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Count one byte dropped outside a frame.
    pub fn record_ignored(&self) {
        self.bytes_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one emitted frame.
    pub fn record_frame(&self, reason: EmitReason) {
        let counter = match reason {
            EmitReason::Terminated => &self.frames_terminated,
            EmitReason::Interrupted => &self.frames_interrupted,
            EmitReason::Overflow => &self.frames_overflow,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count the outcome of one datagram send.
    pub fn record_send(&self, ok: bool) {
        if ok {
            self.datagrams_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.send_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Count one frame dropped by a full queue.
    pub fn record_queue_drop(&self) {
        self.queue_drops.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_ignored: self.bytes_ignored.load(Ordering::Relaxed),
            frames_terminated: self.frames_terminated.load(Ordering::Relaxed),
            frames_interrupted: self.frames_interrupted.load(Ordering::Relaxed),
            frames_overflow: self.frames_overflow.load(Ordering::Relaxed),
            datagrams_sent: self.datagrams_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            queue_drops: self.queue_drops.load(Ordering::Relaxed),
        }
    }

    /// Log a one-line summary.
    pub fn log_summary(&self) {
        let s = self.snapshot();
        info!(
            bytes_read = s.bytes_read,
            bytes_ignored = s.bytes_ignored,
            terminated = s.frames_terminated,
            interrupted = s.frames_interrupted,
            overflow = s.frames_overflow,
            sent = s.datagrams_sent,
            send_failures = s.send_failures,
            queue_drops = s.queue_drops,
            "bridge stopped after {} frames",
            s.frames_total()
        );
    }
}

/// Sink wrapper that counts send outcomes at the point of transmission.
#[derive(Debug)]
pub struct CountingSink<S> {
    inner: S,
    stats: Arc<BridgeStats>,
}

impl<S> CountingSink<S> {
    /// Wrap `inner`, recording into `stats`.
    pub fn new(inner: S, stats: Arc<BridgeStats>) -> Self {
        CountingSink { inner, stats }
    }

    /// Get a reference to the wrapped sink.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: DatagramSink> DatagramSink for CountingSink<S> {
    fn send_datagram(&mut self, packet: &[u8]) -> io::Result<()> {
        let result = self.inner.send_datagram(packet);
        self.stats.record_send(result.is_ok());
        result
    }
}
