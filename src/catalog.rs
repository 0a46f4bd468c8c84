//! Reference catalogs for car and track ordinals.
//!
//! The Data Out stream identifies the selected car and track by integer
//! ordinals. Translating those to display data lives outside this crate: the
//! caller constructs the catalogs once at startup from its own reference data
//! (the record types derive serde traits so any format works) and passes them
//! to [`StaticSessionInfo::decode`](crate::StaticSessionInfo::decode) or a
//! [`TelemetrySession`](crate::TelemetrySession).
//!
//! Lookups never fail. An ordinal missing from the backing data resolves to an
//! explicit `Unknown` descriptor so a frame from an unreleased car or track
//! still produces usable session info.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One car entry in the reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    pub year: u16,
    pub make: String,
    pub model: String,
}

/// One track entry in the reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub circuit: String,
    pub location: String,
    pub country: String,
    pub track_name: String,
    pub length_km: f64,
}

/// Result of a car ordinal lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CarDescriptor {
    Known(CarRecord),
    /// The ordinal was absent from the backing data.
    Unknown { ordinal: i32 },
}

impl CarDescriptor {
    pub fn is_known(&self) -> bool {
        matches!(self, CarDescriptor::Known(_))
    }
}

impl fmt::Display for CarDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarDescriptor::Known(car) => {
                write!(f, "{} {} {}", car.year, car.make, car.model)
            }
            CarDescriptor::Unknown { ordinal } => {
                write!(f, "Car ordinal {ordinal} is not in the reference catalog")
            }
        }
    }
}

/// Result of a track ordinal lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackDescriptor {
    Known(TrackRecord),
    /// The ordinal was absent from the backing data.
    Unknown { ordinal: i32 },
}

impl TrackDescriptor {
    pub fn is_known(&self) -> bool {
        matches!(self, TrackDescriptor::Known(_))
    }
}

impl fmt::Display for TrackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackDescriptor::Known(track) => {
                write!(f, "{} ({}), {}", track.circuit, track.track_name, track.location)
            }
            TrackDescriptor::Unknown { ordinal } => {
                write!(f, "Track ordinal {ordinal} is not in the reference catalog")
            }
        }
    }
}

/// Car ordinal to record mapping.
#[derive(Debug, Clone, Default)]
pub struct CarCatalog {
    entries: HashMap<i32, CarRecord>,
}

impl CarCatalog {
    pub fn new(entries: impl IntoIterator<Item = (i32, CarRecord)>) -> Self {
        Self { entries: entries.into_iter().collect() }
    }

    /// Resolve a car ordinal, returning the `Unknown` sentinel on a miss.
    pub fn lookup(&self, ordinal: i32) -> CarDescriptor {
        match self.entries.get(&ordinal) {
            Some(car) => CarDescriptor::Known(car.clone()),
            None => CarDescriptor::Unknown { ordinal },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Track ordinal to record mapping.
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    entries: HashMap<i32, TrackRecord>,
}

impl TrackCatalog {
    pub fn new(entries: impl IntoIterator<Item = (i32, TrackRecord)>) -> Self {
        Self { entries: entries.into_iter().collect() }
    }

    /// Resolve a track ordinal, returning the `Unknown` sentinel on a miss.
    pub fn lookup(&self, ordinal: i32) -> TrackDescriptor {
        match self.entries.get(&ordinal) {
            Some(track) => TrackDescriptor::Known(track.clone()),
            None => TrackDescriptor::Unknown { ordinal },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The pair of catalogs consumed by static session decoding.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub cars: CarCatalog,
    pub tracks: TrackCatalog,
}

impl Catalogs {
    pub fn new(cars: CarCatalog, tracks: TrackCatalog) -> Self {
        Self { cars, tracks }
    }
}
