use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use sysrgb_keyboard::{KeyId, KeyboardError, KeyboardState};

use super::{check_interval, AnimationError, AnimationKind, Animator};
use crate::color::random_color;

/// Random colors on a random subset of keys each tick
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomParams {
    /// Key or group names to draw from; empty means every layout key
    pub keys: Vec<String>,
    /// Chance of each key being recolored on a tick
    pub density: f64,
    #[serde(rename = "interval_ms", with = "crate::config::millis")]
    pub interval: Duration,
    /// Fixed seed, for reproducible runs
    pub seed: Option<u64>,
}

impl Default for RandomParams {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            density: 0.5,
            interval: Duration::from_millis(500),
            seed: None,
        }
    }
}

impl RandomParams {
    pub(super) fn prepare(self, keyboard: &KeyboardState) -> Result<RandomAnimator, AnimationError> {
        let kind = AnimationKind::Random;
        check_interval(kind, self.interval)?;
        if !(self.density > 0.0 && self.density <= 1.0) {
            return Err(AnimationError::invalid(kind, "density must be in (0, 1]"));
        }

        let registry = keyboard.registry();
        let mut pool: Vec<KeyId> = Vec::new();
        if self.keys.is_empty() {
            pool.extend(registry.layout_keys().map(|k| k.id()));
        } else {
            for name in &self.keys {
                for &id in registry.resolve(name)?.keys() {
                    if !pool.contains(&id) {
                        pool.push(id);
                    }
                }
            }
        }
        if pool.is_empty() {
            return Err(AnimationError::invalid(kind, "no keys to animate"));
        }

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(RandomAnimator {
            pool,
            density: self.density,
            interval: self.interval,
            rng,
        })
    }
}

pub(crate) struct RandomAnimator {
    pool: Vec<KeyId>,
    density: f64,
    interval: Duration,
    rng: StdRng,
}

impl RandomAnimator {
    fn pick(&mut self) -> Vec<KeyId> {
        let density = self.density;
        let rng = &mut self.rng;
        let mut picked: Vec<KeyId> = self
            .pool
            .iter()
            .copied()
            .filter(|_| rng.random_bool(density))
            .collect();
        if picked.is_empty() {
            picked.push(self.pool[self.rng.random_range(0..self.pool.len())]);
        }
        picked
    }
}

impl Animator for RandomAnimator {
    fn tick(&mut self, keyboard: &KeyboardState) -> Result<(), KeyboardError> {
        let frame: Vec<_> = self
            .pick()
            .into_iter()
            .map(|id| (id, random_color(&mut self.rng)))
            .collect();
        keyboard.set_colors("random", &frame)
    }

    fn interval(&self) -> Duration {
        self.interval
    }
}
