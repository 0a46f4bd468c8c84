//! Modern, type-safe Rust library for Forza Motorsport "Data Out" telemetry.
//!
//! Datasport listens for the simulator's fixed-format 331-byte UDP datagrams,
//! decodes them into structured telemetry, and can record raw streams to disk
//! and replay them later at the original cadence.
//!
//! # Features
//!
//! - **Live Telemetry**: background UDP listener publishing consistent
//!   frame + session snapshots at 60 Hz
//! - **Pure Codec**: fixed-offset binary decoding with no I/O or state
//! - **Record & Replay**: capture raw datagrams verbatim and replay them so
//!   consumers cannot tell a sample file from a live race
//! - **Graceful Degradation**: unknown cars, tracks, and class codes decode to
//!   explicit sentinels instead of failing
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use datasport::{Catalogs, Datasport};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> datasport::Result<()> {
//!     // Listen on the address configured in the simulator's Data Out settings.
//!     let session = Datasport::listen("0.0.0.0:9876", Catalogs::default()).await?;
//!
//!     let mut frames = Box::pin(session.frame_updates());
//!     while let Some(frame) = frames.next().await {
//!         println!("{:.0} rpm, gear {}", frame.current_engine_rpm, frame.gear);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Replaying a recorded sample
//!
//! ```rust,no_run
//! use datasport::SamplePlayer;
//!
//! # #[tokio::main]
//! # async fn main() -> datasport::Result<()> {
//! let playback = SamplePlayer::local_default("race.bin").loop_count(2).play().await?;
//! let summary = playback.wait().await?;
//! println!("replayed {} datagrams", summary.datagrams_sent);
//! # Ok(())
//! # }
//! ```

// Core types and error handling
pub mod catalog;
mod error;
pub mod packet;

// Long-running tasks: live listening, capture, replay
pub mod player;
pub mod recorder;
pub mod session;

// Core exports
pub use catalog::{
    CarCatalog, CarDescriptor, CarRecord, Catalogs, TrackCatalog, TrackDescriptor, TrackRecord,
};
pub use error::{Result, TelemetryError};
pub use packet::{
    as_datagram, CarClass, Drivetrain, RawDatagram, StaticSessionInfo, TelemetryFrame, Vec3,
    WheelSet, DATAGRAM_LEN,
};

// Task exports
pub use player::{PlaybackHandle, PlaybackSummary, SamplePlayer, DEFAULT_DESTINATION};
pub use recorder::{RecordingSummary, SampleRecorder};
pub use session::{Snapshot, TelemetrySession};

/// Unified entry point for Data Out telemetry.
///
/// # Examples
///
/// ```rust,no_run
/// use datasport::{Catalogs, Datasport};
///
/// #[tokio::main]
/// async fn main() -> datasport::Result<()> {
///     let session = Datasport::listen("127.0.0.1:9876", Catalogs::default()).await?;
///     // Use session...
///     Ok(())
/// }
/// ```
pub struct Datasport;

impl Datasport {
    /// Start a live telemetry session listening on `addr`.
    ///
    /// Equivalent to [`TelemetrySession::bind`]; see there for the full
    /// contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound to `addr`.
    pub async fn listen<A>(addr: A, catalogs: Catalogs) -> Result<TelemetrySession>
    where
        A: tokio::net::ToSocketAddrs + std::fmt::Debug,
    {
        TelemetrySession::bind(addr, catalogs).await
    }
}
