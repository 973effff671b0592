//! Persistent server mode: accept connections in a loop and relay each to
//! the fixed output sink
//!
//! Connections are handled strictly sequentially; once a relay starts it
//! runs to completion, and shutdown is only observed between relays at
//! the accept boundary. The output sink is opened once and outlives every
//! accepted connection, so successive payloads reach it back-to-back in
//! arrival order.

use std::io::{self, Write as _};
use std::net::SocketAddr;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tracing::{debug, warn};

use crate::endpoint::OutputSink;
use crate::error::RelayError;
use crate::relay;
use crate::shutdown::ShutdownFlag;
use crate::types::BufferSize;

/// Lifecycle states of the server loop
///
/// `Idle` is the state before the listening endpoint exists; the server is
/// constructed directly into `Listening`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerPhase {
    Listening,
    Accepting,
    Relaying,
    Terminating,
}

/// The server loop controller
///
/// Owns the listening endpoint and the single shared output sink for the
/// whole run. Both are released exactly once when the server is dropped,
/// after the accept loop has fully exited.
#[derive(Debug)]
pub struct RelayServer {
    listener: TcpListener,
    sink: OutputSink,
    buffer_size: BufferSize,
    shutdown: ShutdownFlag,
    phase: ServerPhase,
}

impl RelayServer {
    #[must_use]
    pub fn new(
        listener: TcpListener,
        sink: OutputSink,
        buffer_size: BufferSize,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            listener,
            sink,
            buffer_size,
            shutdown,
            phase: ServerPhase::Listening,
        }
    }

    /// Drive accept+relay cycles until shutdown is requested, returning
    /// the total number of bytes relayed across all connections.
    ///
    /// Emits `Accepted from <ip>:<port>` before each relay and
    /// `Closing <ip>:<port>` after it, on stdout.
    ///
    /// # Errors
    ///
    /// A relay failure on any connection is fatal for the whole server;
    /// so is a non-interrupted accept failure. An interrupted accept with
    /// the shutdown flag set is a normal exit.
    pub async fn run(mut self) -> Result<u64, RelayError> {
        let mut total: u64 = 0;

        loop {
            self.transition(ServerPhase::Accepting);
            let accepted = tokio::select! {
                biased;
                _ = self.shutdown.stopped() => None,
                result = self.listener.accept() => Some(result),
            };

            let (mut connection, peer) = match accepted {
                None => break,
                Some(Ok(pair)) => pair,
                Some(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {
                    if self.shutdown.is_stopped() {
                        break;
                    }
                    continue;
                }
                Some(Err(e)) => {
                    return Err(RelayError::resolution(
                        "accept",
                        self.listener
                            .local_addr()
                            .map_or_else(|_| "listener".to_string(), |a| a.to_string()),
                        e,
                    ));
                }
            };

            emit_event("Accepted from", &peer);
            self.transition(ServerPhase::Relaying);

            let copied =
                relay::copy(&mut connection, &mut self.sink, self.buffer_size).await?;
            total += copied;

            emit_event("Closing", &peer);
            debug!(peer = %peer, bytes = copied, "connection relayed");
            // Accepted connection dropped here; the sink stays open
        }

        self.transition(ServerPhase::Terminating);
        if let Err(e) = self.sink.shutdown().await {
            warn!(error = %e, "failed to close output sink cleanly");
        }
        // Listener and sink released exactly once as `self` drops
        Ok(total)
    }

    fn transition(&mut self, next: ServerPhase) {
        if self.phase != next {
            debug!(from = ?self.phase, to = ?next, "server state");
            self.phase = next;
        }
    }
}

/// Write one event line to stdout without aborting on failure
///
/// Stdout may be a closed pipe when `-o` directs the data plane to a
/// socket; a lost event line must not take down the relay.
fn emit_event(event: &str, peer: &SocketAddr) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{} {}:{}", event, peer.ip(), peer.port()) {
        warn!(error = %e, "failed to write event line to stdout");
    }
}
