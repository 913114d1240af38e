//! Frame assembly state machine.
//!
//! The XYE bus carries no length prefix and no escaping. A frame is everything
//! from a start byte up to and including the next end byte, the next start
//! byte, or the byte that makes the buffer too long:
//!
//! ```text
//! +------+----------------------+---------------+
//! | 0xAA | data ...             | 0x55 / 0xAA   |
//! +------+----------------------+---------------+
//! ```
//!
//! Bytes arriving while no frame is open are ignored until the next start byte,
//! so the assembler resynchronises on its own after line noise.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{END, MAX_FRAME_LEN, START};
use crate::error::{ProtocolError, ProtocolResult};

/// Assembly mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssemblerState {
    /// Not inside a frame; waiting for a start byte.
    #[default]
    Idle,
    /// Accumulating bytes of the current frame.
    Assembling,
}

/// Why a frame buffer was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitReason {
    /// An end byte closed the frame.
    Terminated,
    /// A start byte arrived before the end byte. The frame ends with that start byte.
    Interrupted,
    /// The frame reached the maximum length without a sentinel.
    Overflow,
}

impl EmitReason {
    /// Short lowercase name used in logs and statistics.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmitReason::Terminated => "terminated",
            EmitReason::Interrupted => "interrupted",
            EmitReason::Overflow => "overflow",
        }
    }
}

impl fmt::Display for EmitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A frame emitted by the assembler.
///
/// The bytes are frozen at emission and never touched by the assembler again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Why the frame was emitted.
    pub reason: EmitReason,
    /// Raw frame bytes, starting with the start byte.
    pub bytes: Bytes,
}

impl Frame {
    /// Number of bytes in the frame.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the frame holds no bytes. Never true for emitted frames.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Formats the frame as uppercase hex pairs, each followed by a space.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.bytes.iter() {
            write!(f, "{:02X} ", byte)?;
        }
        Ok(())
    }
}

/// Byte-at-a-time frame assembler for the XYE bus.
///
/// Feed every received byte to [`FrameAssembler::process_byte`] in arrival
/// order. Each call returns at most one frame. Checks after appending a byte
/// run in a fixed order: end byte, then start byte, then length.
#[derive(Debug)]
pub struct FrameAssembler {
    state: AssemblerState,
    buffer: BytesMut,
    max_len: usize,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an assembler with the standard maximum frame length.
    pub fn new() -> Self {
        FrameAssembler {
            state: AssemblerState::Idle,
            buffer: BytesMut::with_capacity(MAX_FRAME_LEN),
            max_len: MAX_FRAME_LEN,
        }
    }

    /// Create an assembler with a custom maximum frame length.
    pub fn with_max_len(max_len: usize) -> ProtocolResult<Self> {
        if max_len < 2 {
            return Err(ProtocolError::InvalidMaxLength(max_len));
        }
        Ok(FrameAssembler {
            state: AssemblerState::Idle,
            buffer: BytesMut::with_capacity(max_len),
            max_len,
        })
    }

    /// Current assembly mode.
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Bytes of the frame currently being assembled.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Configured maximum frame length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Drop any partial frame and return to idle.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = AssemblerState::Idle;
    }

    /// Process one received byte.
    ///
    /// Returns `Some(frame)` when this byte ends a frame.
    pub fn process_byte(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            AssemblerState::Idle => {
                if byte == START {
                    self.begin_frame();
                }
                None
            }
            AssemblerState::Assembling => {
                self.buffer.put_u8(byte);

                let reason = if byte == END {
                    EmitReason::Terminated
                } else if byte == START {
                    EmitReason::Interrupted
                } else if self.buffer.len() >= self.max_len - 1 {
                    EmitReason::Overflow
                } else {
                    return None;
                };

                Some(self.emit(reason))
            }
        }
    }

    /// Process a slice of received bytes in order, collecting emitted frames.
    pub fn push(&mut self, data: &[u8]) -> Vec<Frame> {
        data.iter().filter_map(|&b| self.process_byte(b)).collect()
    }

    fn begin_frame(&mut self) {
        self.state = AssemblerState::Assembling;
        self.buffer.clear();
        self.buffer.reserve(self.max_len);
        self.buffer.put_u8(START);
    }

    fn emit(&mut self, reason: EmitReason) -> Frame {
        let bytes = self.buffer.split().freeze();

        log::trace!("xye frame {} ({} bytes)", reason, bytes.len());

        match reason {
            EmitReason::Interrupted => self.begin_frame(),
            EmitReason::Terminated | EmitReason::Overflow => {
                self.state = AssemblerState::Idle;
            }
        }

        Frame { reason, bytes }
    }
}
