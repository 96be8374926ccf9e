use std::time::Duration;

use serde::Deserialize;
use sysrgb_keyboard::{KeyId, KeyboardError, KeyboardState, Rgb};

use super::{check_interval, AnimationError, AnimationKind, Animator};
use crate::color::{hsv_to_rgb, wave_hue};

/// Rainbow moving across the keyboard, one hue per column
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveParams {
    /// Hue difference between neighbouring columns, in degrees
    pub wavelength: f32,
    /// Hue advance per tick, in degrees
    pub phase_step: f32,
    #[serde(rename = "interval_ms", with = "crate::config::millis")]
    pub interval: Duration,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wavelength: 18.0,
            phase_step: 18.0,
            interval: Duration::from_millis(100),
        }
    }
}

impl WaveParams {
    pub(super) fn prepare(self, keyboard: &KeyboardState) -> Result<WaveAnimator, AnimationError> {
        let kind = AnimationKind::Wave;
        check_interval(kind, self.interval)?;
        if !self.wavelength.is_finite() || !self.phase_step.is_finite() {
            return Err(AnimationError::invalid(kind, "wavelength and phase step must be finite"));
        }
        let keys: Vec<(KeyId, usize)> = keyboard
            .registry()
            .layout_keys()
            .filter_map(|k| Some((k.id(), k.column()?)))
            .collect();
        if keys.is_empty() {
            return Err(AnimationError::invalid(kind, "no keys to animate"));
        }
        Ok(WaveAnimator {
            keys,
            wavelength: self.wavelength,
            phase_step: self.phase_step,
            phase: 0.0,
            interval: self.interval,
        })
    }
}

pub(crate) struct WaveAnimator {
    keys: Vec<(KeyId, usize)>,
    wavelength: f32,
    phase_step: f32,
    phase: f32,
    interval: Duration,
}

impl WaveAnimator {
    /// Colors of the current frame, in layout order
    fn frame(&self) -> Vec<(KeyId, Rgb)> {
        self.keys
            .iter()
            .map(|&(id, column)| {
                let hue = wave_hue(column, self.wavelength, self.phase);
                (id, hsv_to_rgb(hue, 1.0, 1.0))
            })
            .collect()
    }
}

impl Animator for WaveAnimator {
    fn tick(&mut self, keyboard: &KeyboardState) -> Result<(), KeyboardError> {
        let frame = self.frame();
        self.phase = (self.phase + self.phase_step).rem_euclid(360.0);
        keyboard.set_colors("wave", &frame)
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}
