//! Per-race static session data.
//!
//! A handful of Data Out fields never change while a race is running: car
//! identity and classification, track identity, and the engine's RPM limits.
//! Their raw bytes arrive with every datagram, but decoding them involves
//! catalog lookups, so [`TelemetrySession`](crate::TelemetrySession) extracts
//! them once per race start instead of 60 times a second.

use crate::catalog::{CarDescriptor, Catalogs, TrackDescriptor};
use std::fmt;

use super::layout;
use super::wire::{f32_at, i32_at};
use super::RawDatagram;

/// Performance class letter assigned to the car.
///
/// Out-of-range codes are carried through as [`CarClass::Invalid`] rather than
/// rejected, so datagrams from newer game versions keep decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarClass {
    E,
    D,
    C,
    B,
    A,
    S,
    R,
    P,
    X,
    Invalid(i32),
}

impl CarClass {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => CarClass::E,
            1 => CarClass::D,
            2 => CarClass::C,
            3 => CarClass::B,
            4 => CarClass::A,
            5 => CarClass::S,
            6 => CarClass::R,
            7 => CarClass::P,
            8 => CarClass::X,
            other => CarClass::Invalid(other),
        }
    }
}

impl fmt::Display for CarClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarClass::E => f.write_str("E"),
            CarClass::D => f.write_str("D"),
            CarClass::C => f.write_str("C"),
            CarClass::B => f.write_str("B"),
            CarClass::A => f.write_str("A"),
            CarClass::S => f.write_str("S"),
            CarClass::R => f.write_str("R"),
            CarClass::P => f.write_str("P"),
            CarClass::X => f.write_str("X"),
            CarClass::Invalid(code) => write!(f, "invalid class code {code}"),
        }
    }
}

/// Drivetrain layout of the car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drivetrain {
    Fwd,
    Rwd,
    Awd,
    Invalid(i32),
}

impl Drivetrain {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Drivetrain::Fwd,
            1 => Drivetrain::Rwd,
            2 => Drivetrain::Awd,
            other => Drivetrain::Invalid(other),
        }
    }
}

impl fmt::Display for Drivetrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drivetrain::Fwd => f.write_str("FWD"),
            Drivetrain::Rwd => f.write_str("RWD"),
            Drivetrain::Awd => f.write_str("AWD"),
            Drivetrain::Invalid(code) => write!(f, "invalid drivetrain code {code}"),
        }
    }
}

/// Telemetry fields that stay constant for the duration of one race.
///
/// Produced when a race transition is detected and replaced wholesale at the
/// next race start; see the refresh rules on
/// [`TelemetrySession`](crate::TelemetrySession).
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSessionInfo {
    pub car_ordinal: i32,
    /// Catalog resolution of `car_ordinal`.
    pub car: CarDescriptor,
    pub car_class: CarClass,
    pub car_performance_index: i32,
    pub drivetrain: Drivetrain,
    pub num_cylinders: i32,

    pub track_ordinal: i32,
    /// Catalog resolution of `track_ordinal`.
    pub track: TrackDescriptor,

    /// Engine max RPM, rounded to the nearest whole number for display.
    pub max_rpm: i32,
    /// Engine idle RPM, rounded to the nearest whole number for display.
    pub idle_rpm: i32,
}

impl StaticSessionInfo {
    /// Decode the static fields of one datagram, resolving ordinals through
    /// the supplied catalogs.
    ///
    /// Pure and total like [`TelemetryFrame::decode`](super::TelemetryFrame::decode):
    /// unknown ordinals and out-of-range class or drivetrain codes degrade to
    /// their sentinel values instead of failing.
    pub fn decode(raw: &RawDatagram, catalogs: &Catalogs) -> Self {
        let car_ordinal = i32_at(raw, layout::CAR_ORDINAL);
        let track_ordinal = i32_at(raw, layout::TRACK_ORDINAL);

        Self {
            car_ordinal,
            car: catalogs.cars.lookup(car_ordinal),
            car_class: CarClass::from_code(i32_at(raw, layout::CAR_CLASS)),
            car_performance_index: i32_at(raw, layout::CAR_PERFORMANCE_INDEX),
            drivetrain: Drivetrain::from_code(i32_at(raw, layout::DRIVETRAIN_TYPE)),
            num_cylinders: i32_at(raw, layout::NUM_CYLINDERS),

            track_ordinal,
            track: catalogs.tracks.lookup(track_ordinal),

            max_rpm: f32_at(raw, layout::ENGINE_MAX_RPM).round() as i32,
            idle_rpm: f32_at(raw, layout::ENGINE_IDLE_RPM).round() as i32,
        }
    }
}
