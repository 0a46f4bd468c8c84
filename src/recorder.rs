//! Sample recording: duration-bounded capture of raw Data Out traffic.
//!
//! The recorder binds its own UDP socket and writes every received datagram's
//! bytes verbatim, in arrival order, to a flat file: no header, no delimiters,
//! no length prefixes. It performs no validation — a datagram that is not 331
//! bytes is still written, and deciding what to do with it is the decoder's
//! job at playback time. UDP loss is accepted silently; a lost datagram is
//! simply absent from the file.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::packet::DATAGRAM_LEN;
use crate::{Result, TelemetryError};

/// What a finished recording captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSummary {
    pub datagrams: u64,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Duration-bounded UDP capture to a file.
///
/// Binding and file creation happen in [`bind`](Self::bind) so setup failures
/// surface before the capture starts; [`record`](Self::record) then runs the
/// bounded loop to completion.
pub struct SampleRecorder {
    socket: UdpSocket,
    writer: BufWriter<fs::File>,
    output_path: PathBuf,
    local_addr: SocketAddr,
    /// Recording window anchor: the duration counts from bind, not from the
    /// first received datagram.
    started: Instant,
    duration: Duration,
    cancel: CancellationToken,
}

impl SampleRecorder {
    /// Bind the listen socket and create the output file.
    ///
    /// Missing parent directories of `output_path` are created. To capture
    /// simulator traffic, bind on all interfaces (`0.0.0.0:<data-out-port>`);
    /// tests use `127.0.0.1:0`.
    pub async fn bind<A>(addr: A, output_path: impl AsRef<Path>, duration: Duration) -> Result<Self>
    where
        A: ToSocketAddrs + std::fmt::Debug,
    {
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|e| TelemetryError::bind_failed(format!("{addr:?}"), e))?;
        let local_addr =
            socket.local_addr().map_err(|e| TelemetryError::socket_error("local_addr", e))?;

        let output_path = output_path.as_ref().to_path_buf();
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| TelemetryError::file_error(&output_path, e))?;
            }
        }
        let file = fs::File::create(&output_path)
            .await
            .map_err(|e| TelemetryError::file_error(&output_path, e))?;

        info!(%local_addr, path = %output_path.display(), ?duration, "recording");

        Ok(Self {
            socket,
            writer: BufWriter::new(file),
            output_path,
            local_addr,
            started: Instant::now(),
            duration,
            cancel: CancellationToken::new(),
        })
    }

    /// The address the capture socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Token for stopping the capture before its duration elapses. The file
    /// is flushed and closed on early shutdown exactly as on normal expiry.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the capture loop until the duration elapses (measured from bind)
    /// or the cancellation token fires.
    pub async fn record(mut self) -> Result<RecordingSummary> {
        let started = self.started;
        let deadline = started + self.duration;
        let mut buf = [0u8; 2048];
        let mut datagrams = 0u64;
        let mut bytes = 0u64;

        loop {
            let received = tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    debug!("recording duration elapsed");
                    break;
                }
                _ = self.cancel.cancelled() => {
                    info!("recording stopped early");
                    break;
                }
                received = self.socket.recv_from(&mut buf) => received,
            };

            let len = match received {
                Ok((len, _peer)) => len,
                Err(e) => {
                    // Flush what was already captured before surfacing.
                    let _ = self.writer.flush().await;
                    return Err(TelemetryError::socket_error("recv", e));
                }
            };

            if len != DATAGRAM_LEN {
                // Still recorded verbatim; validation belongs to the decoder.
                debug!(len, "captured non-conforming datagram");
            }

            if let Err(e) = self.writer.write_all(&buf[..len]).await {
                let _ = self.writer.flush().await;
                return Err(TelemetryError::file_error(&self.output_path, e));
            }
            datagrams += 1;
            bytes += len as u64;
        }

        self.writer
            .flush()
            .await
            .map_err(|e| TelemetryError::file_error(&self.output_path, e))?;

        let summary = RecordingSummary { datagrams, bytes, elapsed: started.elapsed() };
        info!(datagrams, bytes, "recording complete");
        Ok(summary)
    }
}
