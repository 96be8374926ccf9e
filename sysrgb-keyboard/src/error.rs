//! Keyboard interface error types

use std::fmt;
use std::path::PathBuf;

use sysrgb_channel::ChannelError;
use thiserror::Error;

/// One member of a group write that failed
#[derive(Debug)]
pub struct WriteFailure {
    /// Key whose channel failed
    pub key: String,
    pub error: ChannelError,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.error)
    }
}

/// Errors from keyboard operations
#[derive(Error, Debug)]
pub enum KeyboardError {
    /// None of the expected LED nodes exist; the kernel driver is not loaded
    #[error("no RGB keyboard LED nodes found under {} (is the driver loaded?)", root.display())]
    DriverNotFound { root: PathBuf },

    /// Identifier is neither a key nor a group
    #[error("unknown key or group: {0}")]
    UnknownKey(String),

    /// Operation not possible on this target (e.g. brightness on a color-only key)
    #[error("not supported: {0}")]
    Unsupported(String),

    /// Value outside what the node accepts
    #[error("{target}: brightness {value} out of range (max {max})")]
    OutOfRange { target: String, value: u8, max: u8 },

    /// Hardware failure on a single-key target
    #[error("{key}: {source}")]
    Channel {
        key: String,
        #[source]
        source: ChannelError,
    },

    /// Members of a group write failed. Members not listed were written
    /// and are not rolled back.
    #[error("{target}: {} of {attempted} writes failed ({})", failures.len(), failed_names(failures))]
    GroupWrite {
        target: String,
        /// Distinct nodes the write went to
        attempted: usize,
        failures: Vec<WriteFailure>,
    },
}

fn failed_names(failures: &[WriteFailure]) -> String {
    failures
        .iter()
        .map(|f| f.key.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl KeyboardError {
    /// Per-key hardware failures carried by this error, if any
    pub fn failures(&self) -> Vec<(&str, &ChannelError)> {
        match self {
            Self::Channel { key, source } => vec![(key.as_str(), source)],
            Self::GroupWrite { failures, .. } => failures
                .iter()
                .map(|f| (f.key.as_str(), &f.error))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// A group write where at least one node took the new value
    pub fn is_partial(&self) -> bool {
        match self {
            Self::GroupWrite {
                attempted,
                failures,
                ..
            } => failures.len() < *attempted,
            _ => false,
        }
    }

    /// Errors raised while resolving what a name refers to; fatal to the
    /// invoking command
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::UnknownKey(_) | Self::DriverNotFound { .. })
    }
}
