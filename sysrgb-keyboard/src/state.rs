//! Keyboard state - the only writer of LED channels
//!
//! Every write goes through the channel's slot mutex, so two callers (an
//! animation thread and the CLI, say) can never interleave on one node. Writes
//! to different nodes proceed in parallel. The cached color/brightness is
//! updated only after the node accepted the value.

use sysrgb_channel::{Brightness, ChannelBackend, ChannelError, Rgb};
use tracing::{debug, warn};

use crate::error::{KeyboardError, WriteFailure};
use crate::layout::PlatformTable;
use crate::profile::{ApplyReport, ApplyWarning, Profile, ProfileEntry};
use crate::registry::{KeyId, KeyRegistry, Target};

/// Current lighting state of the keyboard, shared behind an `Arc`
pub struct KeyboardState {
    registry: KeyRegistry,
}

impl KeyboardState {
    /// Wrap a registry, seeding the cache from hardware
    pub fn new(registry: KeyRegistry) -> Self {
        let state = Self { registry };
        state.refresh();
        state
    }

    /// Build the registry for `table` and wrap it
    pub fn open(table: &PlatformTable, backend: &dyn ChannelBackend) -> Result<Self, KeyboardError> {
        Ok(Self::new(KeyRegistry::build(table, backend)?))
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    /// Shorthand for [`KeyRegistry::resolve`]
    pub fn resolve(&self, identifier: &str) -> Result<Target, KeyboardError> {
        self.registry.resolve(identifier)
    }

    /// Re-read every present node. Unreadable nodes keep their cached value.
    pub fn refresh(&self) {
        let mut unreadable = 0usize;
        for entry in &self.registry.channels {
            if !entry.info.present {
                continue;
            }
            let mut slot = entry.slot.lock();
            match slot.channel.read_color() {
                Ok(color) => slot.color = color,
                Err(e) => {
                    debug!("read {}: {}", entry.info.node, e);
                    unreadable += 1;
                }
            }
            if entry.info.brightness {
                match slot.channel.read_brightness() {
                    Ok(b) => slot.brightness = Some(b),
                    Err(e) => debug!("read {}: {}", entry.info.node, e),
                }
            }
        }
        if unreadable > 0 {
            warn!("{} LED nodes could not be read back", unreadable);
        }
    }

    fn write_color(&self, key: KeyId, color: Rgb) -> Result<(), ChannelError> {
        let entry = &self.registry.channels[self.registry.get(key).channel];
        let mut slot = entry.slot.lock();
        slot.channel.write_color(color)?;
        slot.color = color;
        Ok(())
    }

    fn write_brightness(&self, key: KeyId, value: Brightness) -> Result<(), ChannelError> {
        let entry = &self.registry.channels[self.registry.get(key).channel];
        let mut slot = entry.slot.lock();
        slot.channel.write_brightness(value)?;
        slot.brightness = Some(value);
        Ok(())
    }

    /// Run `write` once per distinct channel among `keys`. Returns the
    /// number of channels written to and the failures.
    fn write_each<F>(
        &self,
        keys: impl IntoIterator<Item = KeyId>,
        mut write: F,
    ) -> (usize, Vec<WriteFailure>)
    where
        F: FnMut(KeyId) -> Result<(), ChannelError>,
    {
        let mut seen = vec![false; self.registry.channels.len()];
        let mut attempted = 0;
        let mut failures = Vec::new();
        for id in keys {
            let channel = self.registry.get(id).channel;
            if std::mem::replace(&mut seen[channel], true) {
                continue;
            }
            attempted += 1;
            if let Err(error) = write(id) {
                failures.push(WriteFailure {
                    key: self.registry.get(id).name().to_string(),
                    error,
                });
            }
        }
        (attempted, failures)
    }

    fn finish(
        target: &Target,
        (attempted, mut failures): (usize, Vec<WriteFailure>),
    ) -> Result<(), KeyboardError> {
        if failures.is_empty() {
            return Ok(());
        }
        if !target.is_group() && failures.len() == 1 {
            let WriteFailure { key, error } = failures.remove(0);
            return Err(KeyboardError::Channel { key, source: error });
        }
        Err(KeyboardError::GroupWrite {
            target: target.label().to_string(),
            attempted,
            failures,
        })
    }

    /// Set every key of `target` to `color`.
    ///
    /// Group writes continue past failing members; the error lists exactly
    /// the members that failed, the others keep their new color.
    pub fn set_color(&self, target: &Target, color: Rgb) -> Result<(), KeyboardError> {
        let outcome = self.write_each(target.keys().iter().copied(), |id| {
            self.write_color(id, color)
        });
        Self::finish(target, outcome)
    }

    /// Resolve `identifier` and set its color
    pub fn set_color_by_name(&self, identifier: &str, color: Rgb) -> Result<(), KeyboardError> {
        let target = self.resolve(identifier)?;
        self.set_color(&target, color)
    }

    /// Write a different color to each key. Failures are reported under `label`.
    pub fn set_colors(&self, label: &str, colors: &[(KeyId, Rgb)]) -> Result<(), KeyboardError> {
        let mut failures = Vec::new();
        for &(id, color) in colors {
            if let Err(error) = self.write_color(id, color) {
                failures.push(WriteFailure {
                    key: self.registry.get(id).name().to_string(),
                    error,
                });
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(KeyboardError::GroupWrite {
                target: label.to_string(),
                attempted: colors.len(),
                failures,
            })
        }
    }

    /// Members of `target` that have a brightness control
    fn brightness_members(&self, target: &Target) -> Vec<KeyId> {
        target
            .keys()
            .iter()
            .copied()
            .filter(|&id| self.registry.channel_of(id).brightness)
            .collect()
    }

    /// Highest brightness every brightness-capable member of `target` accepts,
    /// `None` if no member has a brightness control
    pub fn max_brightness(&self, target: &Target) -> Option<Brightness> {
        self.brightness_members(target)
            .into_iter()
            .filter_map(|id| self.registry.channel_of(id).max_brightness)
            .min()
    }

    /// Set brightness on the members of `target` that support it.
    ///
    /// Fails with [`KeyboardError::Unsupported`] when none do, and with
    /// [`KeyboardError::OutOfRange`] before writing anything when `value`
    /// exceeds a member's maximum.
    pub fn set_brightness(&self, target: &Target, value: Brightness) -> Result<(), KeyboardError> {
        let members = self.brightness_members(target);
        if members.is_empty() {
            return Err(KeyboardError::Unsupported(format!(
                "{} has no brightness control",
                target.label()
            )));
        }
        if let Some(max) = self.max_brightness(target) {
            if value > max {
                return Err(KeyboardError::OutOfRange {
                    target: target.label().to_string(),
                    value,
                    max,
                });
            }
        }
        let outcome = self.write_each(members, |id| self.write_brightness(id, value));
        Self::finish(target, outcome)
    }

    /// Last color written to (or read from) the key's node
    pub fn color(&self, key: KeyId) -> Rgb {
        self.registry.channels[self.registry.get(key).channel]
            .slot
            .lock()
            .color
    }

    /// Cached brightness, `None` for nodes without brightness control
    pub fn brightness(&self, key: KeyId) -> Option<Brightness> {
        let entry = &self.registry.channels[self.registry.get(key).channel];
        if !entry.info.brightness {
            return None;
        }
        entry.slot.lock().brightness
    }

    /// Capture the cached state of every present node as a profile.
    ///
    /// The keyboard and lightbar entries come first so that loading the
    /// profile paints the aggregate backlight before the individual keys.
    pub fn snapshot(&self) -> Profile {
        let zones = [self.registry.keyboard_key(), self.registry.lightbar_key()];
        zones
            .into_iter()
            .chain(self.registry.layout_keys())
            .filter(|key| self.registry.channel_of(key.id()).present)
            .map(|key| ProfileEntry {
                key: key.name().to_string(),
                color: Some(self.color(key.id())),
                brightness: self.brightness(key.id()),
            })
            .collect()
    }

    /// Write a profile entry by entry.
    ///
    /// Entries name single keys: `keyboard` restores the aggregate backlight,
    /// not every key. Unknown names are skipped with a warning, failing writes
    /// are collected and do not stop the remaining entries.
    pub fn apply(&self, profile: &Profile) -> ApplyReport {
        let mut report = ApplyReport::default();
        for entry in profile.iter() {
            let Some(key) = self.registry.key(&entry.key) else {
                report
                    .warnings
                    .push(ApplyWarning::UnknownKey(entry.key.clone()));
                continue;
            };
            let id = key.id();
            let name = key.name().to_string();
            let mut ok = true;

            if let Some(color) = entry.color {
                if let Err(error) = self.write_color(id, color) {
                    report.failures.push(WriteFailure {
                        key: name.clone(),
                        error,
                    });
                    ok = false;
                }
            }

            if let Some(value) = entry.brightness {
                let info = self.registry.channel_of(id);
                match info.max_brightness {
                    _ if !info.brightness => {
                        report.warnings.push(ApplyWarning::NoBrightness(name.clone()))
                    }
                    Some(max) if value > max => report.warnings.push(ApplyWarning::OutOfRange {
                        key: name.clone(),
                        value,
                        max,
                    }),
                    _ => {
                        if let Err(error) = self.write_brightness(id, value) {
                            report.failures.push(WriteFailure {
                                key: name.clone(),
                                error,
                            });
                            ok = false;
                        }
                    }
                }
            }

            if ok {
                report.applied += 1;
            }
        }
        if !report.failures.is_empty() {
            warn!(
                "profile applied with {} failed writes",
                report.failures.len()
            );
        }
        report
    }
}
