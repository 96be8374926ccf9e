// sysrgb - per-key RGB keyboard control through the kernel LED class
// Color math, animations, profile files and configuration on top of the keyboard core

pub mod animation;
pub mod color;
pub mod config;
pub mod profile;

pub use animation::{
    Animation, AnimationEngine, AnimationError, AnimationKind, AnimationStatus, CancelToken,
    PulseParams, RandomParams, RunStats, WaveParams,
};
pub use config::Config;
pub use profile::{Decoded, ParseWarning, ProfileCodec, ProfileError};

pub use sysrgb_channel::{ChannelBackend, MemoryBackend, SysfsBackend};
pub use sysrgb_keyboard::{KeyboardError, KeyboardState, PlatformTable, Profile, Rgb};
