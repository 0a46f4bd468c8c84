//! Fixed-offset little-endian field readers for Data Out datagrams.
//!
//! The Data Out layout is a third-party wire contract: every field lives at a
//! fixed byte offset inside the 331-byte datagram, little-endian, with no
//! alignment guarantees (the tire wear block starts at offset 311). All readers
//! take the full-length datagram so an out-of-range offset is a programming
//! error in this module, not a runtime condition.

use super::RawDatagram;

pub(crate) fn f32_at(raw: &RawDatagram, offset: usize) -> f32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw[offset..offset + 4]);
    f32::from_le_bytes(bytes)
}

pub(crate) fn i32_at(raw: &RawDatagram, offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

pub(crate) fn u32_at(raw: &RawDatagram, offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&raw[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

pub(crate) fn i16_at(raw: &RawDatagram, offset: usize) -> i16 {
    let mut bytes = [0u8; 2];
    bytes.copy_from_slice(&raw[offset..offset + 2]);
    i16::from_le_bytes(bytes)
}

pub(crate) fn u8_at(raw: &RawDatagram, offset: usize) -> u8 {
    raw[offset]
}

pub(crate) fn i8_at(raw: &RawDatagram, offset: usize) -> i8 {
    raw[offset] as i8
}
