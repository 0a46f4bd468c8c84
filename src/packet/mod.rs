//! Binary codec for Data Out datagrams.
//!
//! Every datagram on the wire is exactly [`DATAGRAM_LEN`] bytes with a fixed
//! little-endian layout published by the simulator. This module decodes one
//! datagram into a [`TelemetryFrame`] (real-time fields, every packet) and,
//! when the session layer asks for it, a [`StaticSessionInfo`] (per-race
//! fields plus catalog resolution).
//!
//! Decoding is pure: no I/O, no state, and byte-identical inputs produce
//! identical outputs. Length validation happens once, at [`as_datagram`];
//! past that boundary both decoders are total functions.

mod frame;
mod layout;
mod static_info;
mod wire;

pub use frame::{TelemetryFrame, Vec3, WheelSet};
pub use static_info::{CarClass, Drivetrain, StaticSessionInfo};

use crate::error::{Result, TelemetryError};

/// Exact size of one Data Out datagram in bytes.
pub const DATAGRAM_LEN: usize = 331;

/// An exact-size raw datagram, the unit of decoding, recording, and playback.
pub type RawDatagram = [u8; DATAGRAM_LEN];

/// Checked conversion from an arbitrary buffer to a raw datagram reference.
///
/// Truncated or oversized buffers are a hard error here so the decoders never
/// see them; the live listener treats that error as a dropped packet.
pub fn as_datagram(buf: &[u8]) -> Result<&RawDatagram> {
    <&RawDatagram>::try_from(buf).map_err(|_| TelemetryError::datagram_size(buf.len()))
}
