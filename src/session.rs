//! Live UDP telemetry session.
//!
//! A [`TelemetrySession`] owns one bound UDP socket and one background receive
//! task. The task decodes each arriving datagram, runs the static-refresh
//! rules, and publishes an immutable [`Snapshot`] through a watch channel.
//! Readers always observe a complete frame + static info pair; nothing is ever
//! mutated in place.
//!
//! ## Static-data refresh
//!
//! Car and track identity only change between races, so the session extracts
//! [`StaticSessionInfo`] exactly once per race start instead of on every
//! datagram:
//!
//! - while no static info has been published for the current race, the first
//!   frame with the race flag on triggers extraction;
//! - when the race flag drops after having been on, the session re-arms so the
//!   next race start extracts again.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::catalog::Catalogs;
use crate::packet::{as_datagram, StaticSessionInfo, TelemetryFrame};
use crate::{Result, TelemetryError};

/// One published state of the session: the latest decoded frame plus the
/// static info current for that frame's race, swapped atomically as a unit.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub frame: Arc<TelemetryFrame>,
    /// `None` until the first frame with the race flag on has been seen.
    pub static_info: Option<Arc<StaticSessionInfo>>,
}

/// Static-refresh bookkeeping. Owned exclusively by the receive task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RefreshState {
    race_on: bool,
    static_sent: bool,
}

impl RefreshState {
    const INITIAL: Self = Self { race_on: false, static_sent: false };

    /// Apply one frame's race flag and report whether static data must be
    /// extracted for this datagram.
    fn observe(&mut self, race_on: bool) -> bool {
        // Race ended: re-arm so the next race start refreshes.
        if self.race_on && !race_on && self.static_sent {
            self.static_sent = false;
        }
        let refresh = !self.static_sent && race_on;
        if refresh {
            self.static_sent = true;
        }
        self.race_on = race_on;
        refresh
    }
}

/// Live telemetry listener bound to a local UDP address.
///
/// Configure the simulator's Data Out target (or a [`SamplePlayer`]
/// destination) to the address this session listens on.
///
/// The background task runs until the session is dropped, [`shutdown`] is
/// called, or the socket fails.
///
/// [`SamplePlayer`]: crate::SamplePlayer
/// [`shutdown`]: TelemetrySession::shutdown
#[derive(Debug)]
pub struct TelemetrySession {
    snapshots: watch::Receiver<Option<Snapshot>>,
    statics: watch::Receiver<Option<Arc<StaticSessionInfo>>>,
    local_addr: SocketAddr,
    cancel: CancellationToken,
}

impl TelemetrySession {
    /// Bind a UDP socket and start the receive task.
    ///
    /// The socket is bound before the task spawns, so a bind failure (port in
    /// use, privileged port) surfaces here synchronously rather than inside
    /// the background task. Port 0 requests an ephemeral port; use
    /// [`local_addr`](Self::local_addr) to discover it.
    pub async fn bind<A>(addr: A, catalogs: Catalogs) -> Result<Self>
    where
        A: ToSocketAddrs + fmt::Debug,
    {
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|e| TelemetryError::bind_failed(format!("{addr:?}"), e))?;
        let local_addr =
            socket.local_addr().map_err(|e| TelemetryError::socket_error("local_addr", e))?;

        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (static_tx, static_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            receive_loop(socket, catalogs, snapshot_tx, static_tx, task_cancel).await;
        });

        info!(%local_addr, "telemetry session listening");

        Ok(Self { snapshots: snapshot_rx, statics: static_rx, local_addr, cancel })
    }

    /// The address the listener socket is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The latest frame + static info pair, if any datagram has arrived yet.
    pub fn latest(&self) -> Option<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// The latest decoded frame.
    pub fn latest_frame(&self) -> Option<Arc<TelemetryFrame>> {
        self.snapshots.borrow().as_ref().map(|s| Arc::clone(&s.frame))
    }

    /// The static info for the current race, if one has started.
    pub fn latest_static(&self) -> Option<Arc<StaticSessionInfo>> {
        self.snapshots.borrow().as_ref().and_then(|s| s.static_info.clone())
    }

    /// Stream of snapshots, one per processed datagram.
    ///
    /// Watch-channel semantics: a slow consumer observes the latest snapshot,
    /// not every intermediate one.
    pub fn updates(&self) -> impl Stream<Item = Snapshot> + Send + 'static {
        WatchStream::new(self.snapshots.clone()).filter_map(|opt| async move { opt })
    }

    /// Stream of frames, one per processed datagram (latest-wins, as
    /// [`updates`](Self::updates)).
    pub fn frame_updates(&self) -> impl Stream<Item = Arc<TelemetryFrame>> + Send + 'static {
        WatchStream::new(self.snapshots.clone())
            .filter_map(|opt| async move { opt.map(|s| s.frame) })
    }

    /// Stream of static session info, emitted only when a race start refreshes
    /// it.
    pub fn static_updates(&self) -> impl Stream<Item = Arc<StaticSessionInfo>> + Send + 'static {
        WatchStream::new(self.statics.clone()).filter_map(|opt| async move { opt })
    }

    /// Stop the receive task. Idempotent; also happens on drop.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TelemetrySession {
    fn drop(&mut self) {
        debug!("dropping telemetry session");
        self.cancel.cancel();
    }
}

/// Receive buffer size. Larger than a datagram so oversized packets arrive
/// untruncated, fail the length check, and are dropped instead of being
/// silently clipped to 331 bytes.
const RECV_BUF_LEN: usize = 2048;

async fn receive_loop(
    socket: UdpSocket,
    catalogs: Catalogs,
    snapshots: watch::Sender<Option<Snapshot>>,
    statics: watch::Sender<Option<Arc<StaticSessionInfo>>>,
    cancel: CancellationToken,
) {
    info!("receive task started");

    let mut buf = [0u8; RECV_BUF_LEN];
    let mut refresh = RefreshState::INITIAL;
    let mut static_info: Option<Arc<StaticSessionInfo>> = None;
    let mut frame_count = 0u64;

    loop {
        let received = tokio::select! {
            _ = cancel.cancelled() => {
                info!(frames = frame_count, "receive task cancelled");
                break;
            }
            received = socket.recv_from(&mut buf) => received,
        };

        let len = match received {
            Ok((len, _peer)) => len,
            Err(e) => {
                // Transport failure is fatal to the session; readers keep the
                // last published snapshot.
                error!(error = %e, "socket receive failed, ending session");
                break;
            }
        };

        // A malformed datagram is dropped with no state change.
        let raw = match as_datagram(&buf[..len]) {
            Ok(raw) => raw,
            Err(_) => {
                debug!(len, "dropping datagram with unexpected size");
                continue;
            }
        };

        let frame = Arc::new(TelemetryFrame::decode(raw));

        if refresh.observe(frame.race_is_on()) {
            let info = Arc::new(StaticSessionInfo::decode(raw, &catalogs));
            debug!(
                car_ordinal = info.car_ordinal,
                track_ordinal = info.track_ordinal,
                "static session info refreshed"
            );
            static_info = Some(Arc::clone(&info));
            let _ = statics.send(Some(info));
        }

        frame_count += 1;
        trace!(frame_count, timestamp_ms = frame.timestamp_ms, "frame decoded");

        let snapshot = Snapshot { frame, static_info: static_info.clone() };
        if snapshots.send(Some(snapshot)).is_err() {
            debug!("all snapshot receivers dropped, ending session");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(state: &mut RefreshState, flags: &[i32]) -> Vec<bool> {
        flags.iter().map(|f| state.observe(*f != 0)).collect()
    }

    #[test]
    fn refresh_fires_once_per_race_start() {
        let mut state = RefreshState::INITIAL;
        assert_eq!(run(&mut state, &[1, 1, 0, 1]), vec![true, false, false, true]);
    }

    #[test]
    fn refresh_state_stays_idle_when_race_never_starts() {
        let mut state = RefreshState::INITIAL;
        assert_eq!(run(&mut state, &[0, 0, 0, 0]), vec![false; 4]);
        assert_eq!(state, RefreshState::INITIAL);
    }

    #[test]
    fn first_frame_with_race_off_is_consistent() {
        // static_sent starts false, so no reset transition is needed for a
        // stream that opens outside a race.
        let mut state = RefreshState::INITIAL;
        assert_eq!(run(&mut state, &[0, 1]), vec![false, true]);
    }

    #[test]
    fn long_pause_between_races_refreshes_only_at_restart() {
        let mut state = RefreshState::INITIAL;
        let fired = run(&mut state, &[1, 1, 1, 0, 0, 0, 1, 1]);
        assert_eq!(fired, vec![true, false, false, false, false, false, true, false]);
    }

    #[test]
    fn refresh_survives_flapping_race_flag() {
        let mut state = RefreshState::INITIAL;
        assert_eq!(run(&mut state, &[1, 0, 1, 0, 1]), vec![true, false, true, false, true]);
    }

    mod live {
        use super::super::*;
        use crate::catalog::{CarCatalog, CarRecord, Catalogs, TrackCatalog};
        use crate::packet::DATAGRAM_LEN;
        use futures::StreamExt;
        use std::time::Duration;
        use tokio::net::UdpSocket;

        const WAIT: Duration = Duration::from_secs(5);

        fn datagram(race_on: i32, car_ordinal: i32, timestamp_ms: u32) -> [u8; DATAGRAM_LEN] {
            let mut raw = [0u8; DATAGRAM_LEN];
            raw[0..4].copy_from_slice(&race_on.to_le_bytes());
            raw[4..8].copy_from_slice(&timestamp_ms.to_le_bytes());
            raw[212..216].copy_from_slice(&car_ordinal.to_le_bytes());
            raw
        }

        fn test_catalogs() -> Catalogs {
            Catalogs::new(
                CarCatalog::new([(
                    7,
                    CarRecord { year: 2020, make: "Koenigsegg".into(), model: "Jesko".into() },
                )]),
                TrackCatalog::default(),
            )
        }

        async fn bound_session() -> (TelemetrySession, UdpSocket) {
            let session = TelemetrySession::bind("127.0.0.1:0", test_catalogs())
                .await
                .expect("bind on an ephemeral port");
            let sender = UdpSocket::bind("127.0.0.1:0").await.expect("bind sender");
            sender.connect(session.local_addr()).await.expect("connect sender");
            (session, sender)
        }

        #[tokio::test]
        async fn publishes_decoded_frames_from_the_wire() {
            let (session, sender) = bound_session().await;
            let mut updates = Box::pin(session.updates());

            sender.send(&datagram(1, 7, 123_456)).await.expect("send datagram");

            let snapshot = tokio::time::timeout(WAIT, updates.next())
                .await
                .expect("snapshot within timeout")
                .expect("stream open");
            assert_eq!(snapshot.frame.is_race_on, 1);
            assert_eq!(snapshot.frame.timestamp_ms, 123_456);
        }

        #[tokio::test]
        async fn snapshot_pairs_frame_with_current_static_info() {
            let (session, sender) = bound_session().await;
            let mut updates = Box::pin(session.updates());

            sender.send(&datagram(1, 7, 1)).await.expect("send datagram");

            let snapshot = tokio::time::timeout(WAIT, updates.next())
                .await
                .expect("snapshot within timeout")
                .expect("stream open");
            let static_info = snapshot.static_info.expect("race-on frame carries static info");
            assert_eq!(static_info.car_ordinal, 7);
            assert!(static_info.car.is_known());
            assert_eq!(session.latest_static().expect("latest static").car_ordinal, 7);
        }

        #[tokio::test]
        async fn wrong_size_datagrams_are_dropped_without_corrupting_state() {
            let (session, sender) = bound_session().await;
            let mut updates = Box::pin(session.updates());

            // Truncated and oversized packets first; neither may publish.
            sender.send(&[0u8; 12]).await.expect("send short");
            sender.send(&[0u8; DATAGRAM_LEN + 40]).await.expect("send long");
            sender.send(&datagram(1, 7, 99)).await.expect("send valid");

            let snapshot = tokio::time::timeout(WAIT, updates.next())
                .await
                .expect("snapshot within timeout")
                .expect("stream open");
            // The first published snapshot comes from the valid datagram, and
            // the race-start refresh still fired for it.
            assert_eq!(snapshot.frame.timestamp_ms, 99);
            assert!(snapshot.static_info.is_some());
        }

        #[tokio::test]
        async fn static_info_refreshes_only_on_race_restart() {
            let (session, sender) = bound_session().await;
            let mut updates = Box::pin(session.updates());

            for (flag, ordinal, stamp) in [(1, 7, 1u32), (1, 7, 2), (0, 7, 3), (1, 9999, 4)] {
                sender.send(&datagram(flag, ordinal, stamp)).await.expect("send datagram");
                // Wait for this datagram to be processed before sending the
                // next so the latest-wins channel does not skip any.
                let snapshot = loop {
                    let s = tokio::time::timeout(WAIT, updates.next())
                        .await
                        .expect("snapshot within timeout")
                        .expect("stream open");
                    if s.frame.timestamp_ms == stamp {
                        break s;
                    }
                };
                match stamp {
                    1 | 2 => {
                        assert_eq!(
                            snapshot.static_info.expect("static set").car_ordinal,
                            7,
                            "mid-race frames keep the race-start static info"
                        );
                    }
                    3 => {
                        // Race over: the pair still exposes the last race's
                        // static info until a new race starts.
                        assert_eq!(snapshot.static_info.expect("static retained").car_ordinal, 7);
                    }
                    _ => {
                        let info = snapshot.static_info.expect("static refreshed");
                        assert_eq!(info.car_ordinal, 9999, "new race re-extracts static info");
                        assert!(!info.car.is_known());
                    }
                }
            }
        }

        #[tokio::test]
        async fn static_updates_emit_once_per_race() {
            let (session, sender) = bound_session().await;
            let mut updates = Box::pin(session.updates());
            let mut statics = Box::pin(session.static_updates());

            for (flag, stamp) in [(1, 1u32), (1, 2), (1, 3)] {
                sender.send(&datagram(flag, 7, stamp)).await.expect("send datagram");
                loop {
                    let s = tokio::time::timeout(WAIT, updates.next())
                        .await
                        .expect("snapshot within timeout")
                        .expect("stream open");
                    if s.frame.timestamp_ms == stamp {
                        break;
                    }
                }
            }

            let first = tokio::time::timeout(WAIT, statics.next())
                .await
                .expect("static update within timeout")
                .expect("stream open");
            assert_eq!(first.car_ordinal, 7);

            // No second static update may be pending after three same-race frames.
            let second =
                tokio::time::timeout(Duration::from_millis(200), statics.next()).await;
            assert!(second.is_err(), "same race must not re-publish static info");
        }

        #[tokio::test]
        async fn bind_failure_surfaces_synchronously() {
            let first = TelemetrySession::bind("127.0.0.1:0", Catalogs::default())
                .await
                .expect("first bind");
            let err = TelemetrySession::bind(first.local_addr(), Catalogs::default())
                .await
                .expect_err("second bind on the same port must fail");
            assert!(matches!(err, TelemetryError::Bind { .. }));
            assert!(err.is_retryable());
        }

        #[tokio::test]
        async fn shutdown_stops_the_receive_task() {
            let (session, sender) = bound_session().await;
            let mut updates = Box::pin(session.updates());

            session.shutdown();

            // The watch sender drops when the task exits, ending the stream.
            let ended = tokio::time::timeout(WAIT, updates.next())
                .await
                .expect("stream closes after shutdown");
            assert!(ended.is_none());

            // Traffic after shutdown is never published.
            sender.send(&datagram(1, 7, 1)).await.expect("send datagram");
            assert!(session.latest().is_none());
        }

        #[tokio::test]
        async fn latest_is_none_before_any_datagram() {
            let session = TelemetrySession::bind("127.0.0.1:0", Catalogs::default())
                .await
                .expect("bind session");
            assert!(session.latest().is_none());
            assert!(session.latest_frame().is_none());
            assert!(session.latest_static().is_none());
        }
    }
}
