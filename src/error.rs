//! Error types for endpoint resolution and the relay loop
//!
//! Every error here is fatal to the whole process: the binary prints a
//! single diagnostic line to stderr and exits with a specific code. There
//! is no per-connection recovery in server mode.

use std::fmt;
use std::io;
use std::panic::Location;

/// Process exit codes
pub mod exit {
    /// Success, including graceful server shutdown
    pub const SUCCESS: i32 = 0;
    /// General fatal error: config conflict, resolution or relay failure
    pub const FAILURE: i32 = 2;
    /// An option requiring a value was given none
    pub const MISSING_VALUE: i32 = 5;
    /// An unrecognized option was supplied
    pub const UNKNOWN_OPTION: i32 = 6;
}

/// Which half of the relay loop an I/O error occurred in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Read,
    Write,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal errors raised by the relay core
///
/// Each variant captures the source location of its construction site so
/// the diagnostic line can point at the failing operation.
#[derive(Debug)]
#[non_exhaustive]
pub enum RelayError {
    /// Mutually exclusive options were both supplied. Detected before any
    /// OS resource is touched.
    Config {
        message: String,
        location: &'static Location<'static>,
    },

    /// An open/parse/bind/listen/connect/accept step failed while turning
    /// an endpoint spec into a live endpoint.
    Resolution {
        operation: &'static str,
        detail: String,
        source: io::Error,
        location: &'static Location<'static>,
    },

    /// A non-retryable read or write failure during relay
    Io {
        phase: Phase,
        source: io::Error,
        location: &'static Location<'static>,
    },
}

impl RelayError {
    /// Configuration conflict, e.g. a filename combined with `-i`
    #[track_caller]
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            location: Location::caller(),
        }
    }

    /// Endpoint resolution failure for the named operation
    #[track_caller]
    #[must_use]
    pub fn resolution(
        operation: &'static str,
        detail: impl Into<String>,
        source: io::Error,
    ) -> Self {
        Self::Resolution {
            operation,
            detail: detail.into(),
            source,
            location: Location::caller(),
        }
    }

    /// Relay loop I/O failure in the given phase
    #[track_caller]
    #[must_use]
    pub fn io(phase: Phase, source: io::Error) -> Self {
        Self::Io {
            phase,
            source,
            location: Location::caller(),
        }
    }

    /// Process exit code for this error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        exit::FAILURE
    }

    /// The operation name shown in the diagnostic line
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Resolution { operation, .. } => operation,
            Self::Io { phase, .. } => phase.as_str(),
        }
    }

    fn location(&self) -> &'static Location<'static> {
        match self {
            Self::Config { location, .. }
            | Self::Resolution { location, .. }
            | Self::Io { location, .. } => location,
        }
    }

    /// Numeric code in the diagnostic line: the OS errno when the error
    /// carries one, otherwise the process exit code.
    #[must_use]
    pub fn numeric_code(&self) -> i32 {
        match self {
            Self::Config { .. } => self.exit_code(),
            Self::Resolution { source, .. } | Self::Io { source, .. } => {
                source.raw_os_error().unwrap_or_else(|| self.exit_code())
            }
        }
    }

    /// Single-line diagnostic for stderr:
    /// `Error (<file> @ <operation>:<line> <code>) - <description>`
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let location = self.location();
        format!(
            "Error ({} @ {}:{} {}) - {}",
            location.file(),
            self.operation(),
            location.line(),
            self.numeric_code(),
            self
        )
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message, .. } => write!(f, "{}", message),
            Self::Resolution {
                operation,
                detail,
                source,
                ..
            } => write!(f, "failed to {} {}: {}", operation, detail, source),
            Self::Io { phase, source, .. } => write!(f, "relay {} failed: {}", phase, source),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config { .. } => None,
            Self::Resolution { source, .. } | Self::Io { source, .. } => Some(source),
        }
    }
}
