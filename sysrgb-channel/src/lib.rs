//! LED channel abstraction for sysfs RGB keyboards
//!
//! A channel is exclusive read/write access to one LED control node: a color
//! triplet file and, for some nodes, a brightness file. Channels know nothing
//! about keys, groups or animations.
//!
//! Backends:
//!
//! - sysfs (`/sys/class/leds/<node>/multi_intensity` + `brightness`)
//! - in-memory fake, for tests and for driving the upper layers without hardware

pub mod error;
pub mod memory;
pub mod sysfs;
pub mod types;

pub use error::ChannelError;
pub use memory::{MemoryBackend, MemoryChannel, WriteRecord};
pub use sysfs::{SysfsBackend, SysfsChannel, DEFAULT_LEDS_ROOT};
pub use types::{Brightness, NodeSpec, ParseColorError, Rgb};

/// Access to one LED node.
///
/// Every successful write is an irreversible change of physical LED state.
/// Color and brightness are independent node writes: a failure between them can
/// leave the two out of sync, there is no rollback.
///
/// Implementations do no locking of their own across calls; callers that share
/// a channel between threads must serialize access to it.
pub trait LedChannel: Send + Sync {
    /// Node name (e.g. `rgb:kbd_backlight_42`)
    fn node(&self) -> &str;

    /// Whether the node exists (driver loaded and exposing it)
    fn is_present(&self) -> bool;

    /// Whether the node has a usable brightness control
    fn supports_brightness(&self) -> bool;

    /// Highest accepted brightness, `None` when brightness is unsupported
    fn max_brightness(&self) -> Option<Brightness>;

    /// Write all three color components in one write call
    fn write_color(&self, color: Rgb) -> Result<(), ChannelError>;

    /// Write the brightness node
    fn write_brightness(&self, brightness: Brightness) -> Result<(), ChannelError>;

    /// Read the color node back
    fn read_color(&self) -> Result<Rgb, ChannelError>;

    /// Read the brightness node back
    fn read_brightness(&self) -> Result<Brightness, ChannelError>;
}

/// Factory for channels, one per node of the platform table
pub trait ChannelBackend: Send + Sync {
    /// Open a channel for `node`. Opening never fails; a missing node is
    /// reported through [`LedChannel::is_present`].
    fn open(&self, node: &NodeSpec) -> Box<dyn LedChannel>;
}
