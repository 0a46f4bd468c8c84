//! Sample playback: re-transmit a recorded Data Out stream over UDP.
//!
//! A recording is a flat concatenation of raw 331-byte datagrams (see
//! [`SampleRecorder`](crate::SampleRecorder)). The player reads it back in
//! 331-byte chunks and sends each as one UDP datagram at the simulator's
//! 60 Hz cadence, so a [`TelemetrySession`](crate::TelemetrySession) listening
//! on the destination cannot tell replayed traffic from a live race.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use tokio::fs;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::packet::DATAGRAM_LEN;
use crate::{Result, TelemetryError};

/// Destination used by [`SamplePlayer::local_default`], matching the usual
/// loopback Data Out configuration.
pub const DEFAULT_DESTINATION: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 9876);

/// Interval between datagram sends, emulating the simulator's 60 Hz output.
const CADENCE: Duration = Duration::from_micros(16_667);

/// What a finished playback transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub datagrams_sent: u64,
    /// Completed passes over the file.
    pub loops: usize,
}

/// Paced re-transmission of a recorded sample file.
#[derive(Debug, Clone)]
pub struct SamplePlayer {
    file_path: PathBuf,
    destination: SocketAddr,
    loop_count: usize,
}

impl SamplePlayer {
    pub fn new(file_path: impl Into<PathBuf>, destination: SocketAddr) -> Self {
        Self { file_path: file_path.into(), destination, loop_count: 1 }
    }

    /// Player targeting [`DEFAULT_DESTINATION`] on the local machine.
    pub fn local_default(file_path: impl Into<PathBuf>) -> Self {
        Self::new(file_path, DEFAULT_DESTINATION)
    }

    /// Number of times to play the full file. Defaults to 1.
    pub fn loop_count(mut self, count: usize) -> Self {
        self.loop_count = count;
        self
    }

    /// Load the recording and start the transmit task.
    ///
    /// The file is read up front, so a missing or unreadable recording fails
    /// here rather than inside the background task. Playback then runs
    /// without blocking the caller; await the returned handle for completion.
    pub async fn play(self) -> Result<PlaybackHandle> {
        let data = fs::read(&self.file_path)
            .await
            .map_err(|e| TelemetryError::file_error(&self.file_path, e))?;

        let remainder = data.len() % DATAGRAM_LEN;
        if remainder != 0 {
            // A tail shorter than one datagram cannot be valid traffic.
            warn!(remainder, "recording ends in a truncated chunk; it will not be transmitted");
        }

        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| TelemetryError::bind_failed("0.0.0.0:0", e))?;
        socket
            .connect(self.destination)
            .await
            .map_err(|e| TelemetryError::socket_error("connect", e))?;

        info!(
            path = %self.file_path.display(),
            destination = %self.destination,
            datagrams = data.len() / DATAGRAM_LEN,
            loops = self.loop_count,
            "playback starting"
        );

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let loop_count = self.loop_count;
        let handle =
            tokio::spawn(
                async move { transmit_loop(socket, data, loop_count, task_cancel).await },
            );

        Ok(PlaybackHandle { handle, cancel })
    }
}

/// Handle to a running playback task.
///
/// The task's lifetime is an explicit contract: hold the handle to keep track
/// of the playback, await [`wait`](Self::wait) for its summary, or call
/// [`stop`](Self::stop) to end it early.
#[derive(Debug)]
pub struct PlaybackHandle {
    handle: JoinHandle<Result<PlaybackSummary>>,
    cancel: CancellationToken,
}

impl PlaybackHandle {
    /// Wait for playback to finish and return its summary.
    pub async fn wait(self) -> Result<PlaybackSummary> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => {
                Err(TelemetryError::socket_error("playback task", std::io::Error::other(e)))
            }
        }
    }

    /// Stop playback before the file (or its loops) completes.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

async fn transmit_loop(
    socket: UdpSocket,
    data: Vec<u8>,
    loop_count: usize,
    cancel: CancellationToken,
) -> Result<PlaybackSummary> {
    let mut interval = tokio::time::interval(CADENCE);
    // A stalled sender should resume at cadence, not burst to catch up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let whole = data.len() - data.len() % DATAGRAM_LEN;
    let mut sent = 0u64;

    for lap in 0..loop_count {
        for chunk in data[..whole].chunks_exact(DATAGRAM_LEN) {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(sent, "playback stopped early");
                    return Ok(PlaybackSummary { datagrams_sent: sent, loops: lap });
                }
                _ = interval.tick() => {}
            }
            socket.send(chunk).await.map_err(|e| TelemetryError::socket_error("send", e))?;
            sent += 1;
        }
        debug!(lap = lap + 1, "finished file pass");
    }

    info!(sent, "playback complete");
    Ok(PlaybackSummary { datagrams_sent: sent, loops: loop_count })
}
