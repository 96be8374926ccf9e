//! Profile files
//!
//! Three formats, picked by file extension:
//!
//! - `.json`: [`JsonCodec`]
//! - `.ini`: [`IniCodec`], one section per key with a `color = r,g,b` option
//! - anything else: [`TextCodec`], one `Key = #rrggbb` line per key
//!
//! A file that cannot be read or is not valid for its format at all is an
//! error. Individual bad entries are skipped and reported as [`ParseWarning`]s.

mod ini;
mod json;
mod text;

pub use ini::IniCodec;
pub use json::JsonCodec;
pub use text::TextCodec;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use sysrgb_keyboard::Profile;
use thiserror::Error;
use tracing::debug;

/// Errors that make a whole profile file unusable
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("cannot read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON profile")]
    Json(#[from] serde_json::Error),
}

/// A malformed entry that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line (entry index for JSON)
    pub line: usize,
    pub message: String,
}

impl ParseWarning {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// A decoded profile plus whatever was skipped on the way
#[derive(Debug, Default)]
pub struct Decoded {
    pub profile: Profile,
    pub warnings: Vec<ParseWarning>,
}

/// Conversion between a [`Profile`] and its on-disk text
pub trait ProfileCodec {
    /// Format name for messages
    fn name(&self) -> &'static str;

    fn encode(&self, profile: &Profile) -> Result<String, ProfileError>;

    fn decode(&self, input: &str) -> Result<Decoded, ProfileError>;
}

/// Codec for a path, chosen by extension
pub fn codec_for(path: &Path) -> Box<dyn ProfileCodec> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => Box::new(JsonCodec),
        Some("ini") => Box::new(IniCodec),
        _ => Box::new(TextCodec),
    }
}

/// Write `profile` to `path` in the format its extension selects
pub fn save(path: &Path, profile: &Profile) -> Result<(), ProfileError> {
    let codec = codec_for(path);
    let content = codec.encode(profile)?;
    std::fs::write(path, content).map_err(|source| ProfileError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "saved {} entries to {} ({})",
        profile.len(),
        path.display(),
        codec.name()
    );
    Ok(())
}

/// Read a profile from `path` in the format its extension selects
pub fn load(path: &Path) -> Result<Decoded, ProfileError> {
    let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let codec = codec_for(path);
    let decoded = codec.decode(&content)?;
    debug!(
        "loaded {} entries from {} ({}, {} skipped)",
        decoded.profile.len(),
        path.display(),
        codec.name(),
        decoded.warnings.len()
    );
    Ok(decoded)
}
