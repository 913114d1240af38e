//! The capture-and-forward run loop.
//!
//! A [`Bridge`] reads from any byte source, feeds every byte to the frame
//! assembler in arrival order, and forwards each emitted frame as one datagram.
//!
//! ## Shutdown
//!
//! The loop checks a shared stop flag between reads. Read timeouts come back
//! as errors of kind `TimedOut`, so a serial port opened with a read timeout
//! notices the flag within one timeout period. A partial frame still in the
//! assembler when the loop exits is dropped.

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};
use xye_protocol::{
    AssemblerState, DatagramSink, EmitReason, Forwarder, Frame, FrameAssembler, PacketHeader,
};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::stats::BridgeStats;

/// Size of each read from the byte source.
const READ_CHUNK: usize = 256;

/// Why [`Bridge::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The stop flag was set.
    Stopped,
    /// The byte source reported end of stream.
    EndOfStream,
}

/// Byte source to datagram sink pipeline.
pub struct Bridge<S> {
    assembler: FrameAssembler,
    forwarder: Forwarder<S>,
    stats: Arc<BridgeStats>,
    stop: Arc<AtomicBool>,
}

impl<S: DatagramSink> Bridge<S> {
    /// Create a bridge from its parts.
    pub fn new(assembler: FrameAssembler, forwarder: Forwarder<S>, stats: Arc<BridgeStats>) -> Self {
        Bridge {
            assembler,
            forwarder,
            stats,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a bridge using the frame length and header codes from `config`.
    pub fn from_config(config: &BridgeConfig, sink: S, stats: Arc<BridgeStats>) -> BridgeResult<Self> {
        let assembler = FrameAssembler::with_max_len(config.max_frame_len)?;
        let forwarder = Forwarder::new(PacketHeader::from(config.header), sink);
        Ok(Self::new(assembler, forwarder, stats))
    }

    /// Flag that ends [`Bridge::run`] when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Shared run statistics.
    pub fn stats(&self) -> &Arc<BridgeStats> {
        &self.stats
    }

    /// The frame assembler.
    pub fn assembler(&self) -> &FrameAssembler {
        &self.assembler
    }

    /// Consume the bridge and return its forwarder.
    pub fn into_forwarder(self) -> Forwarder<S> {
        self.forwarder
    }

    /// Feed one byte through the pipeline.
    pub fn handle_byte(&mut self, byte: u8) {
        if self.assembler.state() == AssemblerState::Idle && byte != xye_protocol::START {
            self.stats.record_ignored();
        }
        if let Some(frame) = self.assembler.process_byte(byte) {
            self.handle_frame(frame);
        }
    }

    /// Feed a slice of bytes through the pipeline in order.
    pub fn handle_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.handle_byte(byte);
        }
    }

    fn handle_frame(&mut self, frame: Frame) {
        self.stats.record_frame(frame.reason);

        match frame.reason {
            EmitReason::Overflow => {
                warn!("Frame error: data length exceeded. Data received: {}", frame);
            }
            EmitReason::Terminated | EmitReason::Interrupted => {
                info!("{}", frame);
            }
        }

        match self.forwarder.forward(&frame.bytes) {
            Ok(len) => trace!("forwarded {} frame as {} byte datagram", frame.reason, len),
            Err(e) => warn!("Failed to forward {} byte frame: {}", frame.len(), e),
        }
    }

    /// Read from `source` until the stop flag is set or the stream ends.
    ///
    /// Timeouts and interrupted reads are retried. Any other read error ends
    /// the run with [`BridgeError::Source`].
    pub fn run<R: Read + ?Sized>(&mut self, source: &mut R) -> BridgeResult<RunOutcome> {
        let mut buf = [0u8; READ_CHUNK];

        let outcome = loop {
            if self.stop.load(Ordering::SeqCst) {
                break RunOutcome::Stopped;
            }

            match source.read(&mut buf) {
                Ok(0) => break RunOutcome::EndOfStream,
                Ok(n) => {
                    self.stats.record_read(n);
                    self.handle_bytes(&buf[..n]);
                }
                Err(e) if is_retryable(&e) => continue,
                Err(e) => {
                    self.discard_partial();
                    return Err(BridgeError::Source(e));
                }
            }
        };

        self.discard_partial();
        Ok(outcome)
    }

    fn discard_partial(&mut self) {
        let partial = self.assembler.buffered().len();
        if partial > 0 {
            debug!("discarding {} byte partial frame", partial);
        }
        self.assembler.reset();
    }
}

fn is_retryable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock
    )
}
