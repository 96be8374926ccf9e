use std::time::Duration;

use serde::Deserialize;
use sysrgb_keyboard::{Brightness, KeyboardError, KeyboardState, Rgb, Target};
use tracing::debug;

use super::{check_interval, AnimationError, AnimationKind, Animator};
use crate::color::TriangleRamp;

/// Brightness ramping up and down on one target
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseParams {
    /// Key or group name
    pub target: String,
    /// Base color written once before the first tick
    #[serde(skip)]
    pub color: Option<Rgb>,
    pub min: Brightness,
    /// Upper bound; defaults to, and is capped at, the target's maximum
    pub max: Option<Brightness>,
    pub step: Brightness,
    #[serde(rename = "interval_ms", with = "crate::config::millis")]
    pub interval: Duration,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            target: "keyboard".to_string(),
            color: None,
            min: 0,
            max: None,
            step: 5,
            interval: Duration::from_millis(100),
        }
    }
}

impl PulseParams {
    pub(super) fn prepare(self, keyboard: &KeyboardState) -> Result<PulseAnimator, AnimationError> {
        let kind = AnimationKind::Pulse;
        check_interval(kind, self.interval)?;
        if self.step == 0 {
            return Err(AnimationError::invalid(kind, "step must be non-zero"));
        }

        let target = keyboard.resolve(&self.target)?;
        let Some(ceiling) = keyboard.max_brightness(&target) else {
            return Err(KeyboardError::Unsupported(format!(
                "{} has no brightness control",
                target.label()
            ))
            .into());
        };
        let max = self.max.unwrap_or(ceiling).min(ceiling);
        if self.min > max {
            return Err(AnimationError::invalid(
                kind,
                format!("min {} above max {}", self.min, max),
            ));
        }

        if let Some(color) = self.color {
            keyboard.set_color(&target, color)?;
        }
        debug!(
            "pulse on {}: {}..={} step {}",
            target.label(),
            self.min,
            max,
            self.step
        );
        Ok(PulseAnimator {
            target,
            ramp: TriangleRamp::new(self.min, max, self.step),
            interval: self.interval,
        })
    }
}

pub(crate) struct PulseAnimator {
    target: Target,
    ramp: TriangleRamp,
    interval: Duration,
}

impl Animator for PulseAnimator {
    fn tick(&mut self, keyboard: &KeyboardState) -> Result<(), KeyboardError> {
        let value = self.ramp.next_value();
        keyboard.set_brightness(&self.target, value)
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysrgb_channel::MemoryBackend;
    use sysrgb_keyboard::{KeySlot, PlatformTable};

    fn keyboard() -> (MemoryBackend, KeyboardState) {
        let backend = MemoryBackend::new();
        let table = PlatformTable::with_layout(vec![vec![Some(KeySlot::new("Esc", 1))]]);
        let kb = KeyboardState::open(&table, &backend).unwrap();
        (backend, kb)
    }

    #[test]
    fn test_max_defaults_to_target_ceiling() {
        let (_backend, kb) = keyboard();
        let anim = PulseParams::default().prepare(&kb).unwrap();
        assert_eq!(anim.ramp.bounds().1, 50);

        let anim = PulseParams {
            target: "lightbar".into(),
            max: Some(250),
            ..PulseParams::default()
        }
        .prepare(&kb)
        .unwrap();
        assert_eq!(anim.ramp.bounds().1, 100);
    }

    #[test]
    fn test_unsupported_target_fails_at_start() {
        let (backend, kb) = keyboard();
        let params = PulseParams {
            target: "Esc".into(),
            color: Some(Rgb::RED),
            ..PulseParams::default()
        };
        assert!(matches!(
            params.prepare(&kb),
            Err(AnimationError::Keyboard(KeyboardError::Unsupported(_)))
        ));
        // Base color is not applied when the target is rejected
        assert_eq!(backend.channel("rgb:kbd_backlight_1").unwrap().write_count(), 0);
    }

    #[test]
    fn test_base_color_then_ramp() {
        let (backend, kb) = keyboard();
        let mut anim = PulseParams {
            target: "lightbar".into(),
            color: Some(Rgb::BLUE),
            min: 10,
            max: Some(30),
            step: 10,
            ..PulseParams::default()
        }
        .prepare(&kb)
        .unwrap();
        for _ in 0..6 {
            anim.tick(&kb).unwrap();
        }
        let node = backend.channel("rgb:lightbar").unwrap();
        assert_eq!(node.color_writes(), vec![Rgb::BLUE]);
        assert_eq!(node.brightness_writes(), vec![10, 20, 30, 20, 10, 20]);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let (_backend, kb) = keyboard();
        let params = PulseParams {
            min: 60,
            ..PulseParams::default()
        };
        // Backlight ceiling is 50
        assert!(matches!(
            params.prepare(&kb),
            Err(AnimationError::InvalidParams { .. })
        ));
    }
}
