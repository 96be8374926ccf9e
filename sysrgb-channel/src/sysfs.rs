//! sysfs LED class channel
//!
//! Each node is a directory under the LED class root:
//!
//! ```text
//! /sys/class/leds/rgb:kbd_backlight_42/
//!     multi_intensity   "r g b", three 0-255 integers
//!     brightness        single integer
//!     max_brightness    single integer (read-only)
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::ChannelError;
use crate::types::{Brightness, NodeSpec, Rgb};
use crate::{ChannelBackend, LedChannel};

/// Default LED class directory
pub const DEFAULT_LEDS_ROOT: &str = "/sys/class/leds";

const COLOR_FILE: &str = "multi_intensity";
const BRIGHTNESS_FILE: &str = "brightness";
const MAX_BRIGHTNESS_FILE: &str = "max_brightness";

/// Channel backed by one sysfs LED node directory
#[derive(Debug, Clone)]
pub struct SysfsChannel {
    node: String,
    dir: PathBuf,
    brightness: bool,
    max_override: Option<Brightness>,
}

impl SysfsChannel {
    /// Create a channel for `spec` under `root`
    pub fn new(root: &Path, spec: &NodeSpec) -> Self {
        Self {
            node: spec.name.clone(),
            dir: root.join(&spec.name),
            brightness: spec.brightness,
            max_override: spec.max_brightness,
        }
    }

    fn color_path(&self) -> PathBuf {
        self.dir.join(COLOR_FILE)
    }

    fn brightness_path(&self) -> PathBuf {
        self.dir.join(BRIGHTNESS_FILE)
    }

    /// Write `payload` with a single write call. sysfs attributes only accept
    /// complete values, so a partial write is an error.
    fn write_value(path: &Path, payload: &str) -> Result<(), ChannelError> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|source| ChannelError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        let written = file
            .write(payload.as_bytes())
            .map_err(|source| ChannelError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        if written != payload.len() {
            return Err(ChannelError::ShortWrite {
                path: path.to_path_buf(),
                written,
                expected: payload.len(),
            });
        }
        trace!("{} <- {:?}", path.display(), payload);
        Ok(())
    }

    fn read_value(path: &Path) -> Result<String, ChannelError> {
        let content = fs::read_to_string(path).map_err(|source| ChannelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let content = content.trim();
        if content.is_empty() {
            return Err(ChannelError::Malformed {
                path: path.to_path_buf(),
                content: String::new(),
            });
        }
        Ok(content.to_string())
    }

    fn read_driver_max(&self) -> Option<Brightness> {
        let content = fs::read_to_string(self.dir.join(MAX_BRIGHTNESS_FILE)).ok()?;
        let value: u32 = content.trim().parse().ok()?;
        Some(value.min(u32::from(Brightness::MAX)) as Brightness)
    }
}

/// Encode a color the way the driver expects it in `multi_intensity`
pub fn encode_color(color: Rgb) -> String {
    format!("{} {} {}", color.r, color.g, color.b)
}

/// Decode `multi_intensity` contents. The driver may print more than three
/// intensities for some nodes; only the first three are used.
pub fn decode_color(content: &str) -> Option<Rgb> {
    let mut parts = content
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let mut next = || -> Option<u8> {
        let v: u32 = parts.next()?.parse().ok()?;
        Some(v.min(255) as u8)
    };
    Some(Rgb::new(next()?, next()?, next()?))
}

impl LedChannel for SysfsChannel {
    fn node(&self) -> &str {
        &self.node
    }

    fn is_present(&self) -> bool {
        self.dir.is_dir()
    }

    fn supports_brightness(&self) -> bool {
        self.brightness && self.brightness_path().exists()
    }

    fn max_brightness(&self) -> Option<Brightness> {
        if !self.supports_brightness() {
            return None;
        }
        match (self.max_override, self.read_driver_max()) {
            (Some(ours), Some(driver)) => Some(ours.min(driver)),
            (Some(ours), None) => Some(ours),
            (None, Some(driver)) => Some(driver),
            (None, None) => Some(Brightness::MAX),
        }
    }

    fn write_color(&self, color: Rgb) -> Result<(), ChannelError> {
        Self::write_value(&self.color_path(), &encode_color(color))
    }

    fn write_brightness(&self, brightness: Brightness) -> Result<(), ChannelError> {
        if !self.supports_brightness() {
            return Err(ChannelError::NoBrightness {
                node: self.node.clone(),
            });
        }
        Self::write_value(&self.brightness_path(), &brightness.to_string())
    }

    fn read_color(&self) -> Result<Rgb, ChannelError> {
        let path = self.color_path();
        let content = Self::read_value(&path)?;
        decode_color(&content).ok_or(ChannelError::Malformed { path, content })
    }

    fn read_brightness(&self) -> Result<Brightness, ChannelError> {
        let path = self.brightness_path();
        let content = Self::read_value(&path)?;
        match content.parse::<u32>() {
            Ok(v) => Ok(v.min(u32::from(Brightness::MAX)) as Brightness),
            Err(_) => Err(ChannelError::Malformed { path, content }),
        }
    }
}

/// Opens [`SysfsChannel`]s under one LED class root
#[derive(Debug, Clone)]
pub struct SysfsBackend {
    root: PathBuf,
}

impl SysfsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ChannelBackend for SysfsBackend {
    fn open(&self, node: &NodeSpec) -> Box<dyn LedChannel> {
        Box::new(SysfsChannel::new(&self.root, node))
    }
}
