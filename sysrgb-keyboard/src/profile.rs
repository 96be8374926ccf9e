//! Saved lighting state
//!
//! A profile is an ordered list of key names with the color (and optionally
//! brightness) to restore. Names are kept as written so a profile saved on one
//! layout can still be loaded on another; unknown names surface as warnings
//! when the profile is applied.

use std::fmt;

use sysrgb_channel::{Brightness, Rgb};

use crate::error::WriteFailure;

/// One key of a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    pub key: String,
    pub color: Option<Rgb>,
    pub brightness: Option<Brightness>,
}

impl ProfileEntry {
    pub fn new(key: impl Into<String>, color: Rgb) -> Self {
        Self {
            key: key.into(),
            color: Some(color),
            brightness: None,
        }
    }
}

/// Ordered key -> color mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    entries: Vec<ProfileEntry>,
}

impl Profile {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(&mut self, key: &str) -> &mut ProfileEntry {
        let pos = self
            .entries
            .iter()
            .position(|e| e.key.eq_ignore_ascii_case(key));
        let idx = match pos {
            Some(idx) => idx,
            None => {
                self.entries.push(ProfileEntry {
                    key: key.to_string(),
                    color: None,
                    brightness: None,
                });
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx]
    }

    /// Set a key's color, keeping its position if already present
    pub fn set_color(&mut self, key: &str, color: Rgb) {
        self.entry_mut(key).color = Some(color);
    }

    /// Set a key's brightness, keeping its position if already present
    pub fn set_brightness(&mut self, key: &str, brightness: Brightness) {
        self.entry_mut(key).brightness = Some(brightness);
    }

    /// Append an entry, replacing an existing one with the same name
    pub fn push(&mut self, entry: ProfileEntry) {
        let slot = self.entry_mut(&entry.key);
        slot.color = entry.color.or(slot.color);
        slot.brightness = entry.brightness.or(slot.brightness);
    }

    pub fn get(&self, key: &str) -> Option<&ProfileEntry> {
        self.entries.iter().find(|e| e.key.eq_ignore_ascii_case(key))
    }

    pub fn color(&self, key: &str) -> Option<Rgb> {
        self.get(key).and_then(|e| e.color)
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProfileEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ProfileEntry> for Profile {
    fn from_iter<I: IntoIterator<Item = ProfileEntry>>(iter: I) -> Self {
        let mut profile = Profile::new();
        for entry in iter {
            profile.push(entry);
        }
        profile
    }
}

/// Non-fatal problem found while applying a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyWarning {
    /// Name not in the registry; the entry was skipped
    UnknownKey(String),
    /// Brightness given for a key without brightness control
    NoBrightness(String),
    /// Brightness above what the node accepts; not written
    OutOfRange {
        key: String,
        value: Brightness,
        max: Brightness,
    },
}

impl fmt::Display for ApplyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "unknown key {key}, skipped"),
            Self::NoBrightness(key) => write!(f, "{key} has no brightness control, ignored"),
            Self::OutOfRange { key, value, max } => {
                write!(f, "{key}: brightness {value} above {max}, ignored")
            }
        }
    }
}

/// Outcome of applying a profile
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Entries written without error
    pub applied: usize,
    pub warnings: Vec<ApplyWarning>,
    pub failures: Vec<WriteFailure>,
}

impl ApplyReport {
    /// No warnings and no failures
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.failures.is_empty()
    }
}
