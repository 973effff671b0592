//! Endpoint factory: turns endpoint specs into live, owned I/O handles
//!
//! Resolution is the only place OS resources are acquired. Each live
//! endpoint is exclusively owned by its creator and released exactly once
//! by Drop, on every exit path.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf, Stdin, Stdout};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::debug;

use crate::config::{InputSpec, OutputSpec};
use crate::error::RelayError;
use crate::types::Port;

/// Pending connections queued by a listening endpoint
const LISTEN_BACKLOG: u32 = 5;

/// A live, readable input endpoint for a one-shot relay
#[derive(Debug)]
pub enum InputSource {
    Stdin(Stdin),
    File(File),
}

/// A live, writable output endpoint
///
/// In server mode a single sink outlives every accepted connection;
/// successive payloads are delivered back-to-back with no delimiter.
#[derive(Debug)]
pub enum OutputSink {
    Stdout(Stdout),
    Connected(TcpStream),
}

/// Result of resolving an input spec: either a one-shot byte source or a
/// listening endpoint that produces connections via accept
#[derive(Debug)]
pub enum ResolvedInput {
    Source(InputSource),
    Listener(TcpListener),
}

/// Resolve the input spec into a live endpoint
///
/// # Errors
///
/// Returns a `Resolution` error if the file cannot be opened, the address
/// is malformed, or any socket/bind/listen step fails.
pub async fn resolve_input(spec: &InputSpec) -> Result<ResolvedInput, RelayError> {
    match spec {
        InputSpec::Stdin => Ok(ResolvedInput::Source(InputSource::Stdin(tokio::io::stdin()))),
        InputSpec::File(path) => {
            let file = File::open(path)
                .await
                .map_err(|e| RelayError::resolution("open", path.display().to_string(), e))?;
            debug!(path = %path.display(), "opened input file");
            Ok(ResolvedInput::Source(InputSource::File(file)))
        }
        InputSpec::Listen { address, port } => {
            let listener = bind_listener(address, *port)?;
            Ok(ResolvedInput::Listener(listener))
        }
    }
}

/// Resolve the output spec into a live endpoint
///
/// # Errors
///
/// Returns a `Resolution` error if the address is malformed or the
/// connect fails.
pub async fn resolve_output(spec: &OutputSpec) -> Result<OutputSink, RelayError> {
    match spec {
        OutputSpec::Stdout => Ok(OutputSink::Stdout(tokio::io::stdout())),
        OutputSpec::Connect { address, port } => {
            let addr = parse_address(address, *port)?;
            let stream = TcpStream::connect(addr)
                .await
                .map_err(|e| RelayError::resolution("connect", addr.to_string(), e))?;
            debug!(%addr, "connected output socket");
            Ok(OutputSink::Connected(stream))
        }
    }
}

/// Parse a numeric IPv4 address into a socket address
fn parse_address(address: &str, port: Port) -> Result<SocketAddr, RelayError> {
    let ip: Ipv4Addr = address.parse().map_err(|_| {
        RelayError::resolution(
            "parse-addr",
            address.to_string(),
            io::Error::new(io::ErrorKind::InvalidInput, "invalid address"),
        )
    })?;
    Ok(SocketAddr::V4(SocketAddrV4::new(ip, port.get())))
}

/// Create, bind and start a listening socket with address reuse enabled.
/// Accepting happens in the server loop, not here.
fn bind_listener(address: &str, port: Port) -> Result<TcpListener, RelayError> {
    let addr = parse_address(address, port)?;
    let socket =
        TcpSocket::new_v4().map_err(|e| RelayError::resolution("socket", addr.to_string(), e))?;
    socket
        .set_reuseaddr(true)
        .map_err(|e| RelayError::resolution("setsockopt", addr.to_string(), e))?;
    socket
        .bind(addr)
        .map_err(|e| RelayError::resolution("bind", addr.to_string(), e))?;
    let listener = socket
        .listen(LISTEN_BACKLOG)
        .map_err(|e| RelayError::resolution("listen", addr.to_string(), e))?;
    debug!(%addr, backlog = LISTEN_BACKLOG, "listening for input connections");
    Ok(listener)
}

impl AsyncRead for InputSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut *self {
            Self::Stdin(stdin) => Pin::new(stdin).poll_read(cx, buf),
            Self::File(file) => Pin::new(file).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for OutputSink {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut *self {
            Self::Stdout(stdout) => Pin::new(stdout).poll_write(cx, buf),
            Self::Connected(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            Self::Stdout(stdout) => Pin::new(stdout).poll_flush(cx),
            Self::Connected(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut *self {
            Self::Stdout(stdout) => Pin::new(stdout).poll_shutdown(cx),
            Self::Connected(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
