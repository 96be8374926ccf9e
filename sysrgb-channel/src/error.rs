//! Channel error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while talking to an LED node
#[derive(Error, Debug)]
pub enum ChannelError {
    // Write side
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("short write to {}: {written} of {expected} bytes", path.display())]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    #[error("LED node {node} has no brightness control")]
    NoBrightness { node: String },

    // Read side
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed contents in {}: {content:?}", path.display())]
    Malformed { path: PathBuf, content: String },
}

impl ChannelError {
    /// Hardware write failure (node missing, permission denied, I/O error, partial write)
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Write { .. } | Self::ShortWrite { .. } | Self::NoBrightness { .. }
        )
    }

    /// Hardware read failure (I/O error or unparsable contents)
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Malformed { .. })
    }

    /// True when the underlying I/O error says the file is not there
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Write { source, .. } | Self::Read { source, .. } => {
                source.kind() == io::ErrorKind::NotFound
            }
            Self::NoBrightness { .. } => true,
            _ => false,
        }
    }

    /// True when the node exists but we are not allowed to touch it
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Write { source, .. } | Self::Read { source, .. } => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}
