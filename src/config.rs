//! User configuration
//!
//! Read from `$XDG_CONFIG_HOME/sysrgb/config.toml` (or `~/.config/sysrgb/config.toml`).
//! A missing file means defaults.
//!
//! ```toml
//! leds_root = "/sys/class/leds"
//!
//! [random]
//! density = 0.3
//! interval_ms = 250
//!
//! [wave]
//! wavelength = 12.0
//!
//! [pulse]
//! target = "lightbar"
//! step = 10
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::animation::{PulseParams, RandomParams, WaveParams};

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// LED class directory, `/sys/class/leds` when unset
    pub leds_root: Option<PathBuf>,
    pub random: RandomParams,
    pub wave: WaveParams,
    pub pulse: PulseParams,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the default location. Only an explicitly
    /// named file has to exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = default_config_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    tracing::debug!("no config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.random.density > 0.0 && self.random.density <= 1.0) {
            bail!("random.density must be in (0, 1], got {}", self.random.density);
        }
        for (name, interval) in [
            ("random", self.random.interval),
            ("wave", self.wave.interval),
            ("pulse", self.pulse.interval),
        ] {
            if interval.is_zero() {
                bail!("{name}.interval_ms must be non-zero");
            }
        }
        if self.pulse.step == 0 {
            bail!("pulse.step must be non-zero");
        }
        if let Some(max) = self.pulse.max {
            if self.pulse.min > max {
                bail!("pulse.min {} above pulse.max {}", self.pulse.min, max);
            }
        }
        Ok(())
    }
}

/// Default config path, honouring `XDG_CONFIG_HOME`
pub fn default_config_path() -> PathBuf {
    dirs_path().join(CONFIG_FILE)
}

fn dirs_path() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("sysrgb")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config/sysrgb")
    } else {
        PathBuf::from("/etc/sysrgb")
    }
}

/// `Duration` as integer milliseconds
pub(crate) mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
