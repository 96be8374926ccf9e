// Color and ramp math used by the animations. Pure functions, no hardware.

use rand::Rng;
use sysrgb_keyboard::{Brightness, Rgb};

/// Convert HSV to RGB
/// h: hue (degrees, wraps)
/// s: saturation (0-1)
/// v: value/brightness (0-1)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    Rgb::from_hsv(h, s, v)
}

/// Hue of a key in the wave animation, in [0, 360)
pub fn wave_hue(column: usize, wavelength: f32, phase: f32) -> f32 {
    (column as f32 * wavelength + phase).rem_euclid(360.0)
}

/// Uniformly random color, each component independent
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    Rgb::new(rng.random(), rng.random(), rng.random())
}

/// Triangle wave between two bounds.
///
/// Each call to [`TriangleRamp::next_value`] returns the current value, then
/// moves it by `step`. A move that reaches or crosses a bound lands exactly on
/// the bound and reverses direction, so both bounds are always emitted.
#[derive(Debug, Clone)]
pub struct TriangleRamp {
    min: Brightness,
    max: Brightness,
    step: i16,
    value: i16,
    rising: bool,
}

impl TriangleRamp {
    /// Ramp starting at `min` and rising. Swapped bounds are reordered and a
    /// zero step moves by one.
    pub fn new(min: Brightness, max: Brightness, step: Brightness) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            step: i16::from(step.max(1)),
            value: i16::from(min),
            rising: true,
        }
    }

    /// Lower and upper bound, in order
    pub fn bounds(&self) -> (Brightness, Brightness) {
        (self.min, self.max)
    }

    pub fn next_value(&mut self) -> Brightness {
        let current = self.value as Brightness;
        let (lo, hi) = (i16::from(self.min), i16::from(self.max));
        if self.rising {
            self.value += self.step;
            if self.value >= hi {
                self.value = hi;
                self.rising = false;
            }
        } else {
            self.value -= self.step;
            if self.value <= lo {
                self.value = lo;
                self.rising = true;
            }
        }
        current
    }
}

impl Iterator for TriangleRamp {
    type Item = Brightness;

    fn next(&mut self) -> Option<Brightness> {
        Some(self.next_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hsv_to_rgb() {
        // Red
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        // Green
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), Rgb::new(0, 255, 0));
        // Blue
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), Rgb::new(0, 0, 255));
        // Wraps
        assert_eq!(hsv_to_rgb(360.0, 1.0, 1.0), Rgb::new(255, 0, 0));
        // White (no saturation)
        assert_eq!(hsv_to_rgb(0.0, 0.0, 1.0), Rgb::new(255, 255, 255));
        // Black (no value)
        assert_eq!(hsv_to_rgb(0.0, 1.0, 0.0), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_wave_hue_advances_per_column() {
        let hues: Vec<f32> = (0..20).map(|c| wave_hue(c, 18.0, 42.0)).collect();
        // Neighbours are one wavelength apart modulo a full turn
        for w in hues.windows(2) {
            assert_eq!((w[1] - w[0]).rem_euclid(360.0), 18.0, "{w:?}");
        }
        assert!(hues.iter().all(|h| (0.0..360.0).contains(h)));
        assert_eq!(hues[18], 6.0);
        assert_eq!(wave_hue(0, 18.0, 370.0), 10.0);
        assert_eq!(wave_hue(3, 18.0, -54.0), 0.0);
    }

    #[test]
    fn test_triangle_ramp_full_range() {
        let seq: Vec<u8> = TriangleRamp::new(0, 255, 15).take(200).collect();
        assert!(seq.contains(&0));
        assert!(seq.contains(&255));
        assert_eq!(&seq[..3], &[0, 15, 30]);
        assert_eq!(seq[17], 255);
        assert_eq!(seq[18], 240);
        assert_eq!(seq[34], 0);
        assert_eq!(seq[35], 15);
    }

    #[test]
    fn test_triangle_ramp_reverses_only_at_bounds() {
        // Step does not divide the range: the bound is still hit exactly
        let seq: Vec<u8> = TriangleRamp::new(10, 50, 15).take(60).collect();
        assert!(seq.iter().all(|&v| (10..=50).contains(&v)));
        for w in seq.windows(3) {
            let up = w[1] > w[0];
            let next_up = w[2] > w[1];
            if up != next_up {
                assert!(w[1] == 10 || w[1] == 50, "turned at {}", w[1]);
            }
        }
        assert_eq!(&seq[..6], &[10, 25, 40, 50, 35, 20]);
    }

    #[test]
    fn test_triangle_ramp_degenerate() {
        let mut flat = TriangleRamp::new(30, 30, 5);
        assert!((0..10).all(|_| flat.next_value() == 30));

        let swapped = TriangleRamp::new(100, 0, 0);
        assert_eq!(swapped.bounds(), (0, 100));
        let seq: Vec<u8> = swapped.take(3).collect();
        assert_eq!(seq, vec![0, 1, 2]);
    }

    #[test]
    fn test_random_color_is_deterministic_per_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(random_color(&mut a), random_color(&mut b));
    }
}
