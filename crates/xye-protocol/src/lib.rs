//! Midea XYE Bus Protocol
//!
//! This crate turns raw bytes captured from a Midea "XYE" RS-485 bus into
//! delimited frames and wraps each frame into the `HVAC_shark` datagram
//! format understood by existing network-side consumers.
//!
//! # Protocol Overview
//!
//! The XYE bus is a half-duplex master/slave bus. Frames are delimited by two
//! sentinel bytes that share the value space of ordinary data (no escaping):
//!
//! - **Start** (`0xAA`): begins a frame; a start seen mid-frame interrupts it
//! - **End** (`0x55`): terminates a frame
//!
//! Frames that reach the maximum length without either sentinel are cut off
//! and forwarded as overflow frames.
//!
//! # Example
//!
//! ```rust
//! use xye_protocol::{EmitReason, FrameAssembler, PacketHeader};
//!
//! let mut assembler = FrameAssembler::new();
//! let frames = assembler.push(&[0xAA, 0x01, 0x02, 0x55]);
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].reason, EmitReason::Terminated);
//!
//! let packet = PacketHeader::default().encode(&frames[0].bytes);
//! assert_eq!(&packet[..10], b"HVAC_shark");
//! ```

mod assembler;
mod constants;
mod error;
mod forward;
mod packet;

pub use assembler::*;
pub use constants::*;
pub use error::*;
pub use forward::*;
pub use packet::*;
