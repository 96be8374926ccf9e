//! Key registry - logical key names and groups mapped onto LED channels
//!
//! Built once from a [`PlatformTable`]. Every key maps to exactly one channel;
//! a channel may serve several keys. The registry owns the channels but only
//! [`KeyboardState`](crate::KeyboardState) touches them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use sysrgb_channel::{Brightness, ChannelBackend, LedChannel, NodeSpec, Rgb};
use tracing::{debug, warn};

use crate::error::KeyboardError;
use crate::layout::PlatformTable;

/// Group membership of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Aggregate keyboard backlight, and as a target every key on the keyboard
    Keyboard,
    /// System lightbar
    Lightbar,
    /// A single key of the layout grid
    Individual,
}

impl Group {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keyboard => "keyboard",
            Self::Lightbar => "lightbar",
            Self::Individual => "individual",
        }
    }

    /// Parse a group target name (case-insensitive). `individual` is a
    /// membership, not a target, and does not parse.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "keyboard" => Some(Self::Keyboard),
            "lightbar" => Some(Self::Lightbar),
            _ => None,
        }
    }
}

/// Index of a key in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub(crate) usize);

impl KeyId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A logical key
#[derive(Debug, Clone)]
pub struct Key {
    id: KeyId,
    name: String,
    group: Group,
    position: Option<(usize, usize)>,
    pub(crate) channel: usize,
}

impl Key {
    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Group {
        self.group
    }

    /// (row, column) of the key's first grid cell; `None` for zone keys
    pub fn position(&self) -> Option<(usize, usize)> {
        self.position
    }

    pub fn row(&self) -> Option<usize> {
        self.position.map(|(row, _)| row)
    }

    pub fn column(&self) -> Option<usize> {
        self.position.map(|(_, col)| col)
    }
}

/// Mutable half of a channel: the node handle and its last written values.
/// Guarded by one mutex per channel, which is what serializes writes.
pub(crate) struct ChannelSlot {
    pub(crate) channel: Box<dyn LedChannel>,
    pub(crate) color: Rgb,
    pub(crate) brightness: Option<Brightness>,
}

pub(crate) struct ChannelEntry {
    pub(crate) info: ChannelInfo,
    pub(crate) slot: Mutex<ChannelSlot>,
}

/// What the registry found out about a node at build time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub node: String,
    pub present: bool,
    pub brightness: bool,
    pub max_brightness: Option<Brightness>,
}

/// A resolved write target: one key or a group of keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    label: String,
    group: Option<Group>,
    keys: Vec<KeyId>,
}

impl Target {
    /// Name the target was resolved from (canonical key name or group name)
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Group, when the identifier named one
    pub fn group(&self) -> Option<Group> {
        self.group
    }

    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }

    pub fn keys(&self) -> &[KeyId] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Registry of keys and the channels behind them
pub struct KeyRegistry {
    leds_root: PathBuf,
    keys: Vec<Key>,
    by_name: HashMap<String, KeyId>,
    grid: Vec<Vec<Option<KeyId>>>,
    columns: usize,
    keyboard: KeyId,
    lightbar: KeyId,
    pub(crate) channels: Vec<ChannelEntry>,
}

struct Builder<'a> {
    backend: &'a dyn ChannelBackend,
    channels: Vec<ChannelEntry>,
    by_node: HashMap<String, usize>,
}

impl Builder<'_> {
    fn channel(&mut self, spec: &NodeSpec) -> usize {
        if let Some(&idx) = self.by_node.get(&spec.name) {
            return idx;
        }
        let channel = self.backend.open(spec);
        let info = ChannelInfo {
            node: spec.name.clone(),
            present: channel.is_present(),
            brightness: channel.supports_brightness(),
            max_brightness: channel.max_brightness(),
        };
        if !info.present {
            debug!("LED node {} not present", spec.name);
        }
        let idx = self.channels.len();
        self.channels.push(ChannelEntry {
            info,
            slot: Mutex::new(ChannelSlot {
                channel,
                color: Rgb::BLACK,
                brightness: None,
            }),
        });
        self.by_node.insert(spec.name.clone(), idx);
        idx
    }
}

fn lookup_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl KeyRegistry {
    /// Build the registry from the platform table, opening one channel per
    /// distinct node through `backend`.
    ///
    /// Fails with [`KeyboardError::DriverNotFound`] when none of the nodes exist.
    pub fn build(
        table: &PlatformTable,
        backend: &dyn ChannelBackend,
    ) -> Result<Self, KeyboardError> {
        let mut builder = Builder {
            backend,
            channels: Vec::new(),
            by_node: HashMap::new(),
        };
        let mut keys: Vec<Key> = Vec::new();
        let mut by_name: HashMap<String, KeyId> = HashMap::new();
        let mut grid: Vec<Vec<Option<KeyId>>> =
            table.layout.iter().map(|row| vec![None; row.len()]).collect();

        for (row, col, slot) in table.cells() {
            let lookup = lookup_key(&slot.name);
            if Group::parse(&lookup).is_some() {
                warn!("layout key {:?} shadows a group name, skipped", slot.name);
                continue;
            }
            if let Some(&id) = by_name.get(&lookup) {
                grid[row][col] = Some(id);
                continue;
            }
            let channel = builder.channel(&table.key_node(slot.node));
            let id = KeyId(keys.len());
            keys.push(Key {
                id,
                name: slot.name.clone(),
                group: Group::Individual,
                position: Some((row, col)),
                channel,
            });
            by_name.insert(lookup, id);
            grid[row][col] = Some(id);
        }

        let mut zone = |name: &str, group: Group, spec: &NodeSpec| {
            let channel = builder.channel(spec);
            let id = KeyId(keys.len());
            keys.push(Key {
                id,
                name: name.to_string(),
                group,
                position: None,
                channel,
            });
            by_name.insert(name.to_string(), id);
            id
        };
        let keyboard = zone(Group::Keyboard.name(), Group::Keyboard, &table.backlight);
        let lightbar = zone(Group::Lightbar.name(), Group::Lightbar, &table.lightbar);

        let channels = builder.channels;
        let present = channels.iter().filter(|c| c.info.present).count();
        if present == 0 {
            return Err(KeyboardError::DriverNotFound {
                root: table.leds_root.clone(),
            });
        }
        debug!(
            "Key registry: {} keys over {} LED nodes ({} present)",
            keys.len(),
            channels.len(),
            present
        );

        Ok(Self {
            leds_root: table.leds_root.clone(),
            keys,
            by_name,
            grid,
            columns: table.columns(),
            keyboard,
            lightbar,
            channels,
        })
    }

    /// LED class directory the table pointed at
    pub fn leds_root(&self) -> &Path {
        &self.leds_root
    }

    /// Resolve a key or group name (case-insensitive)
    pub fn resolve(&self, identifier: &str) -> Result<Target, KeyboardError> {
        match Group::parse(identifier) {
            Some(Group::Keyboard) => {
                let mut keys = vec![self.keyboard];
                keys.extend(self.layout_keys().map(Key::id));
                Ok(Target {
                    label: Group::Keyboard.name().to_string(),
                    group: Some(Group::Keyboard),
                    keys,
                })
            }
            Some(Group::Lightbar) => Ok(Target {
                label: Group::Lightbar.name().to_string(),
                group: Some(Group::Lightbar),
                keys: vec![self.lightbar],
            }),
            _ => {
                let key = self
                    .key(identifier)
                    .ok_or_else(|| KeyboardError::UnknownKey(identifier.to_string()))?;
                Ok(self.target_for(key.id))
            }
        }
    }

    /// Single-key target
    pub fn target_for(&self, id: KeyId) -> Target {
        Target {
            label: self.get(id).name.clone(),
            group: None,
            keys: vec![id],
        }
    }

    /// Look up one key by name, zone keys included (case-insensitive)
    pub fn key(&self, name: &str) -> Option<&Key> {
        self.by_name.get(&lookup_key(name)).map(|&id| self.get(id))
    }

    pub fn get(&self, id: KeyId) -> &Key {
        &self.keys[id.0]
    }

    /// Every key: layout keys top-to-bottom, left-to-right, then the
    /// keyboard and lightbar zone keys
    pub fn all_keys(&self) -> &[Key] {
        &self.keys
    }

    /// Keys of the layout grid in layout order
    pub fn layout_keys(&self) -> impl Iterator<Item = &Key> {
        self.keys.iter().filter(|k| k.group == Group::Individual)
    }

    /// Aggregate backlight key
    pub fn keyboard_key(&self) -> &Key {
        self.get(self.keyboard)
    }

    /// Lightbar key
    pub fn lightbar_key(&self) -> &Key {
        self.get(self.lightbar)
    }

    /// Key covering a grid cell
    pub fn key_at(&self, row: usize, column: usize) -> Option<&Key> {
        let id = (*self.grid.get(row)?.get(column)?)?;
        Some(self.get(id))
    }

    /// Width of the key grid
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Build-time view of every channel
    pub fn channels(&self) -> impl Iterator<Item = &ChannelInfo> {
        self.channels.iter().map(|c| &c.info)
    }

    /// Channel behind a key
    pub fn channel_of(&self, id: KeyId) -> &ChannelInfo {
        &self.channels[self.get(id).channel].info
    }
}
