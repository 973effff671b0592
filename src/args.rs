//! Command-line argument parsing for the relay binary
//!
//! Flags mirror the classic netcat-style surface: a positional input file
//! (mutually exclusive with `-i`), listen/connect addresses and ports, and
//! a transfer buffer size. An optional TOML file can supply defaults;
//! flags always win.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{FileConfig, InputSpec, OutputSpec, RelayConfig};
use crate::error::{self, RelayError};
use crate::types::{BufferSize, Port};

/// Parse port from a command line argument
fn parse_port(s: &str) -> Result<Port, String> {
    s.parse()
}

/// Parse buffer size from a command line argument
fn parse_buffer_size(s: &str) -> Result<BufferSize, String> {
    s.parse()
}

/// Command-line arguments for the relay binary
#[derive(Parser, Debug, Clone)]
#[command(
    name = "bytepipe",
    version,
    about = "Relay bytes between files, standard streams and TCP sockets"
)]
pub struct Args {
    /// Input file (mutually exclusive with -i; default: stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Listen address for input; enables persistent server mode
    #[arg(short = 'i', value_name = "ADDR", env = "BYTEPIPE_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Connect address for output (default: stdout)
    #[arg(short = 'o', value_name = "ADDR", env = "BYTEPIPE_CONNECT_ADDR")]
    pub connect_addr: Option<String>,

    /// Input listen port (default: 5000)
    #[arg(short = 'p', value_name = "PORT", value_parser = parse_port)]
    pub listen_port: Option<Port>,

    /// Output connect port (default: 5000)
    #[arg(short = 'P', value_name = "PORT", value_parser = parse_port)]
    pub connect_port: Option<Port>,

    /// Transfer buffer size in bytes (default: 1024)
    #[arg(short = 'b', value_name = "BYTES", value_parser = parse_buffer_size)]
    pub buffer_size: Option<BufferSize>,

    /// Optional TOML file with defaults for the flags above
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Resolve the final configuration, layering flags over the optional
    /// config file.
    ///
    /// The filename/`-i` conflict is rejected here, before any socket or
    /// file is opened.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error on conflicting options or an unreadable
    /// config file.
    pub fn into_config(self) -> Result<RelayConfig, RelayError> {
        let defaults = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let listen_addr = self.listen_addr.or(defaults.listen_addr);
        let connect_addr = self.connect_addr.or(defaults.connect_addr);
        let listen_port = self
            .listen_port
            .or(defaults.listen_port)
            .unwrap_or(Port::DEFAULT);
        let connect_port = self
            .connect_port
            .or(defaults.connect_port)
            .unwrap_or(Port::DEFAULT);
        let buffer_size = self
            .buffer_size
            .or(defaults.buffer_size)
            .unwrap_or(BufferSize::DEFAULT);

        if self.file.is_some() && listen_addr.is_some() {
            return Err(RelayError::config("can't pass -i and a filename"));
        }

        let input = match (self.file, listen_addr) {
            (Some(path), None) => InputSpec::File(path),
            (None, Some(address)) => InputSpec::Listen {
                address,
                port: listen_port,
            },
            _ => InputSpec::Stdin,
        };

        let output = match connect_addr {
            Some(address) => OutputSpec::Connect {
                address,
                port: connect_port,
            },
            None => OutputSpec::Stdout,
        };

        Ok(RelayConfig {
            input,
            output,
            buffer_size,
        })
    }
}

/// Process exit code for a clap parse failure
///
/// `-p` with no following value exits 5, an unrecognized option exits 6,
/// help/version exit 0 and anything else is a general fatal error.
#[must_use]
pub fn exit_code_for(err: &clap::Error) -> i32 {
    use clap::error::ErrorKind;

    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => error::exit::SUCCESS,
        ErrorKind::InvalidValue => error::exit::MISSING_VALUE,
        ErrorKind::UnknownArgument => error::exit::UNKNOWN_OPTION,
        _ => error::exit::FAILURE,
    }
}
