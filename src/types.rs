//! Validated configuration newtypes using NonZero types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::{NonZeroU16, NonZeroUsize};
use std::str::FromStr;
use thiserror::Error;

/// Validation errors for configuration values
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("port cannot be 0")]
    InvalidPort,

    #[error("buffer size cannot be 0")]
    InvalidBufferSize,
}

/// A validated network port number that cannot be zero
///
/// Port 0 is reserved and cannot be used as a relay endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Port(NonZeroU16);

impl Port {
    /// Create a new Port from a u16, returning None if port is 0
    #[must_use]
    pub const fn new(port: u16) -> Option<Self> {
        match NonZeroU16::new(port) {
            Some(nz) => Some(Self(nz)),
            None => None,
        }
    }

    /// Get the port number as u16
    #[must_use]
    #[inline]
    pub const fn get(&self) -> u16 {
        self.0.get()
    }

    /// Default relay port for both the listen and connect sides (5000)
    pub const DEFAULT: Self = Self(NonZeroU16::new(5000).unwrap());
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl TryFrom<u16> for Port {
    type Error = ValidationError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ValidationError::InvalidPort)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.get()
    }
}

impl FromStr for Port {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let port: u16 = s.parse().map_err(|e| format!("invalid port number: {}", e))?;
        Self::new(port).ok_or_else(|| ValidationError::InvalidPort.to_string())
    }
}

impl Serialize for Port {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.get())
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        Self::new(port).ok_or_else(|| serde::de::Error::custom("port cannot be 0"))
    }
}

/// A non-zero transfer buffer size in bytes
///
/// The relay loop reads at most this many bytes per call; a zero-sized
/// buffer would make the loop misread every source as end-of-stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferSize(NonZeroUsize);

impl BufferSize {
    /// Create a new BufferSize, returning None if value is 0
    #[must_use]
    pub const fn new(size: usize) -> Option<Self> {
        match NonZeroUsize::new(size) {
            Some(nz) => Some(Self(nz)),
            None => None,
        }
    }

    /// Get the size as usize
    #[must_use]
    #[inline]
    pub const fn get(&self) -> usize {
        self.0.get()
    }

    /// Default transfer buffer size (1024 bytes)
    pub const DEFAULT: Self = Self(NonZeroUsize::new(1024).unwrap());
}

impl fmt::Display for BufferSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

impl From<BufferSize> for usize {
    fn from(size: BufferSize) -> Self {
        size.get()
    }
}

impl TryFrom<usize> for BufferSize {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(ValidationError::InvalidBufferSize)
    }
}

impl FromStr for BufferSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size: usize = s
            .parse()
            .map_err(|e| format!("invalid buffer size: {}", e))?;
        Self::new(size).ok_or_else(|| ValidationError::InvalidBufferSize.to_string())
    }
}

impl Serialize for BufferSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.get() as u64)
    }
}

impl<'de> Deserialize<'de> for BufferSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let size = usize::deserialize(deserializer)?;
        Self::new(size).ok_or_else(|| serde::de::Error::custom("buffer size cannot be 0"))
    }
}
