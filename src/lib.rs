//! bytepipe: a single-threaded byte relay
//!
//! Connects one input endpoint (stdin, a regular file, or an incoming TCP
//! connection) to one output endpoint (stdout or an outgoing TCP
//! connection) and copies bytes until end-of-stream. With a listen address
//! it becomes a persistent relay server: connections are accepted in a
//! loop, one at a time, and each is relayed to the same fixed output sink
//! until an interrupt requests graceful shutdown.
//!
//! The crate is organized around the run lifecycle:
//! - [`args`] / [`config`]: CLI surface and the resolved option set
//! - [`endpoint`]: turning endpoint specs into live, owned I/O handles
//! - [`relay`]: the copy loop
//! - [`server`]: the sequential accept+relay loop
//! - [`shutdown`]: interrupt-driven cancellation at the accept boundary

pub mod args;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod relay;
pub mod server;
pub mod shutdown;
pub mod types;

pub use args::Args;
pub use config::{FileConfig, InputSpec, OutputSpec, RelayConfig};
pub use endpoint::{InputSource, OutputSink, ResolvedInput, resolve_input, resolve_output};
pub use error::{Phase, RelayError};
pub use relay::copy;
pub use server::RelayServer;
pub use shutdown::ShutdownFlag;
pub use types::{BufferSize, Port, ValidationError};
