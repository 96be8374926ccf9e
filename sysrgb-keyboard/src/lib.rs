//! Logical keyboard on top of LED channels
//!
//! This crate maps key names and groups ("keyboard", "lightbar") onto the LED
//! nodes of the platform table and owns the only write path to them:
//!
//! - [`KeyRegistry`] resolves names to keys and keys to channels
//! - [`KeyboardState`] serializes writes per channel and caches what was written
//! - [`Profile`] is a saved snapshot of that state

pub mod error;
pub mod layout;
pub mod profile;
pub mod registry;
pub mod state;

pub use error::{KeyboardError, WriteFailure};
pub use layout::{KeySlot, PlatformTable};
pub use profile::{ApplyReport, ApplyWarning, Profile, ProfileEntry};
pub use registry::{ChannelInfo, Group, Key, KeyId, KeyRegistry, Target};
pub use state::KeyboardState;

pub use sysrgb_channel::{Brightness, Rgb};
